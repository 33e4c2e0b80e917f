//! 重试策略：固定延迟、有上限的重试，包住单个分片的一次下载尝试。

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::internal::downloader::structs::download_config::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
};
use crate::internal::downloader::structs::{DownloadConfig, DownloadError};

/// 一次带重试的执行结果。
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// 某次尝试成功
    Succeeded { value: T, attempts: usize },
    /// 每次都是可重试错误，重试次数用尽
    Exhausted {
        attempts: usize,
        last_error: DownloadError,
    },
    /// 遇到不可重试的错误或被取消，立即停止
    Aborted {
        attempts: usize,
        error: DownloadError,
    },
}

/// 固定延迟重试：最多 `max_retries + 1` 次尝试，每次失败后等待 `delay`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }

    /// 总尝试次数上限（首次 + 重试）。
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// 执行 `op`，参数为从 1 开始的尝试序号。
    ///
    /// 只有 [`DownloadError::is_retryable`] 的错误才会重试；重试等待期间取消会立即返回。
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, DownloadError>>,
    {
        let mut attempts = 0;
        loop {
            if cancel.is_cancelled() {
                return RetryOutcome::Aborted {
                    attempts,
                    error: DownloadError::Cancelled,
                };
            }

            attempts += 1;
            let err = match op(attempts).await {
                Ok(value) => return RetryOutcome::Succeeded { value, attempts },
                Err(e) if !e.is_retryable() => {
                    return RetryOutcome::Aborted { attempts, error: e };
                }
                Err(e) => e,
            };

            if attempts > self.max_retries {
                return RetryOutcome::Exhausted {
                    attempts,
                    last_error: err,
                };
            }

            warn!(attempt = attempts, error = %err, "尝试失败，{:?} 后重试", self.delay);
            tokio::select! {
                _ = cancel.cancelled() => {
                    return RetryOutcome::Aborted {
                        attempts,
                        error: DownloadError::Cancelled,
                    };
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}
