//! 下载引擎
//!
//! 把一个 URL 下载到本地文件：按 Range 切分为分片并发下载，写入预分配文件的对应偏移，
//! 汇总进度，失败分片按固定延迟重试，并在开始前判断本地已有文件能否续传或直接复用。
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! # use fast_download::downloader::DownloadEngine;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = DownloadEngine::new()
//!     .max_concurrent_segments(4)
//!     .with_on_progress_hook(|done, total| println!("{done}/{total:?}"))
//!     .start_download("https://example.com/files/big.iso", "./downloads")?;
//!
//! handle.subscribe_progress(false, |pct| println!("{pct:.2}%"));
//! let outcome = handle.wait().await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ## 状态
//!
//! `Planning → Fetching → Completed`、`Planning → AlreadyComplete`、`Fetching → PartiallyFailed`；
//! 致命错误（本地 I/O、远程大小未知、服务器忽略 Range 等）进入 `Failed`，调用 `cancel()` 进入 `Cancelled`。
//! 部分失败的文件在失败分片处留有空洞，不会自动清理，下次启动时按分片记录续传。

mod download_handle;
mod progress_pump;
mod run_download;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::internal::filename::derive_filename;
use crate::internal::resolver::{RedirectResolver, UrlResolver};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::chunked_download::ProgressAggregator;
use super::structs::hook_adapters::{
    AfterCompleteHookAdapter, BeforeStartHookAdapter, OnProgressHookAdapter,
};
use super::structs::{DownloadConfig, DownloadError, DownloadHooksContainer, DownloadOutcome, DownloadState};
use super::traits::download::{DownloadHook, HookAbort};
use progress_pump::ProgressPump;
use run_download::{run_download, RunDownloadParams};

pub use download_handle::DownloadHandle;

/// 下载引擎：链式配置后调用 [`DownloadEngine::start_download`] 或 [`DownloadEngine::download_to`]。
pub struct DownloadEngine {
    pub(crate) config: DownloadConfig,
    pub(crate) client: Option<Client>,
    pub(crate) resolver: Option<Arc<dyn UrlResolver>>,
    pub(crate) hooks: DownloadHooksContainer,
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadEngine {
    pub fn new() -> Self {
        Self {
            config: DownloadConfig::default(),
            client: None,
            resolver: None,
            hooks: DownloadHooksContainer::default(),
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// 整体替换配置。
    pub fn with_config(mut self, config: DownloadConfig) -> Self {
        self.config = config;
        self
    }

    /// 每个分片的字节数。
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    /// 分片失败后的最大重试次数（不含首次）。
    pub fn max_retries(mut self, n: usize) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 建连与单次读取的超时；仅对引擎自建的 HTTP 客户端生效。
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 同时进行的分片请求数上限（不是分片总数）。
    pub fn max_concurrent_segments(mut self, n: usize) -> Self {
        self.config.max_concurrent_segments = n;
        self
    }

    /// 每次写盘的字节数上限，也是进度上报的粒度。
    pub fn read_chunk_size(mut self, bytes: usize) -> Self {
        self.config.read_chunk_size = bytes;
        self
    }

    pub fn hash_buffer_size(mut self, bytes: usize) -> Self {
        self.config.hash_buffer_size = bytes;
        self
    }

    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.config.resolve_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 是否在目标文件旁维护 `.segments.json` 分片记录。
    pub fn track_segments(mut self, enabled: bool) -> Self {
        self.config.track_segments = enabled;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// 使用外部 HTTP 客户端；此时 `request_timeout` 与 `user_agent` 由该客户端自行决定。
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// 替换地址解析器；默认为 [`RedirectResolver`]。
    pub fn with_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// 注册「开始前」钩子；闭包返回 `Err(HookAbort)` 会中止本次下载。
    pub fn with_before_start_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HookAbort>> + Send + 'static,
    {
        self.hooks.add(BeforeStartHookAdapter(f));
        self
    }

    /// 注册「进度」钩子；参数为已写入字节数、总大小（规划前为 `None`）。
    pub fn with_on_progress_hook<F>(mut self, f: F) -> Self
    where
        F: FnMut(u64, Option<u64>) + Send + Sync + 'static,
    {
        self.hooks.add(OnProgressHookAdapter(f));
        self
    }

    /// 注册「完成后」钩子；任务以 Completed / AlreadyComplete / PartiallyFailed 结束时调用。
    pub fn with_after_complete_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: FnMut(DownloadOutcome) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.hooks.add(AfterCompleteHookAdapter(f));
        self
    }

    /// 添加完整钩子；可多次调用，按注册顺序执行。
    pub fn with_hook(mut self, hook: impl DownloadHook + 'static) -> Self {
        self.hooks.add(hook);
        self
    }

    /// 下载到 `directory`，文件名由 URL 推导。
    pub fn start_download(
        self,
        url: &str,
        directory: impl AsRef<Path>,
    ) -> Result<DownloadHandle, DownloadError> {
        let name = derive_filename(url)?;
        self.download_to(url, directory.as_ref().join(name))
    }

    /// 下载到指定路径。需在 tokio 运行时中调用；任务在后台执行，通过返回的句柄观察与等待。
    pub fn download_to(
        self,
        url: &str,
        path: impl Into<PathBuf>,
    ) -> Result<DownloadHandle, DownloadError> {
        self.config.validate()?;
        Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{url}: {e}")))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DownloadError::NoRuntime)?;

        let client = match self.client {
            Some(c) => c,
            None => {
                // 只限制建连与每次读取，不限制整个响应体的传输时长
                let timeout = self.config.request_timeout();
                let mut builder = Client::builder()
                    .connect_timeout(timeout)
                    .read_timeout(timeout);
                if let Some(ua) = &self.config.user_agent {
                    builder = builder.user_agent(ua.clone());
                }
                builder.build()?
            }
        };
        let resolver: Arc<dyn UrlResolver> = match self.resolver {
            Some(r) => r,
            None => Arc::new(RedirectResolver::new(client.clone())),
        };

        let destination = path.into();
        let progress = ProgressAggregator::new();
        let state = UnlockReactiveProperty::new(DownloadState::Planning);
        let cancel = CancellationToken::new();
        let has_hooks = !self.hooks.is_empty();
        let hooks = Arc::new(Mutex::new(self.hooks));
        let pump =
            has_hooks.then(|| ProgressPump::spawn(&runtime, &progress, Arc::clone(&hooks)));

        let task = runtime.spawn(run_download(
            RunDownloadParams {
                client,
                url: url.to_string(),
                destination: destination.clone(),
                config: self.config,
                resolver,
                hooks,
                progress: progress.clone(),
                state: state.clone(),
                cancel: cancel.clone(),
            },
            pump,
        ));

        Ok(DownloadHandle {
            destination,
            progress,
            state,
            cancel,
            task,
        })
    }
}
