use std::path::{Path, PathBuf};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::internal::downloader::chunked_download::ProgressAggregator;
use crate::internal::downloader::structs::{
    DownloadError, DownloadOutcome, DownloadProgress, DownloadState,
};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

/// 正在进行的下载任务句柄。
///
/// 丢弃句柄不会停止任务；需要停止时调用 [`DownloadHandle::cancel`]。
pub struct DownloadHandle {
    pub(crate) destination: PathBuf,
    pub(crate) progress: ProgressAggregator,
    pub(crate) state: UnlockReactiveProperty<DownloadState>,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<Result<DownloadOutcome, DownloadError>>,
}

impl DownloadHandle {
    /// 目标文件路径。
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// 下载进度；返回可共享句柄，`.watch()` 后 `changed().await` 监听进度。
    pub fn progress(&self) -> UnlockReactiveProperty<DownloadProgress> {
        self.progress.property().clone()
    }

    /// 当前进度百分比；总大小尚未确定时为 `NaN`。
    pub fn snapshot(&self) -> f64 {
        self.progress.snapshot()
    }

    /// 任务状态。
    pub fn state(&self) -> UnlockReactiveProperty<DownloadState> {
        self.state.clone()
    }

    pub fn current_state(&self) -> DownloadState {
        self.state.get_current().unwrap_or(DownloadState::Planning)
    }

    /// 取消任务：进行中的分片在下一块数据或重试等待处停止，任务以 `Cancelled` 结束。
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 是否调用过 [`cancel`](Self::cancel)；分片致命错误引起的内部中止不算。
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 订阅进度百分比；回调在独立任务中执行，慢回调只会让中间值被合并。
    pub fn subscribe_progress<F>(&self, return_current_value: bool, callback: F) -> JoinHandle<()>
    where
        F: Fn(f64) + Send + 'static,
    {
        let mut watcher = self.progress.property().watch();

        // 在订阅时刻取当前值，而不是等任务开始执行
        let current = if return_current_value {
            watcher.borrow()
        } else {
            None
        };

        tokio::spawn(async move {
            if let Some(current) = current {
                callback(current.pct());
            }

            while let Ok(progress) = watcher.changed().await {
                callback(progress.pct());
            }
        })
    }

    /// 订阅任务状态变化。
    pub fn subscribe_state<F>(&self, return_current_value: bool, callback: F) -> JoinHandle<()>
    where
        F: Fn(DownloadState) + Send + 'static,
    {
        let mut watcher = self.state.watch();

        let current = if return_current_value {
            watcher.borrow()
        } else {
            None
        };

        tokio::spawn(async move {
            if let Some(current) = current {
                callback(current);
            }

            while let Ok(state) = watcher.changed().await {
                callback(state);
            }
        })
    }

    /// 等待任务结束。
    pub async fn wait(self) -> Result<DownloadOutcome, DownloadError> {
        self.task.await?
    }
}
