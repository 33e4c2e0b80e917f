/// 下载任务状态（由引擎内部维护，外部只读监听）
///
/// `Planning → Fetching → Completed`，`Planning → AlreadyComplete`，
/// `Fetching → PartiallyFailed`；致命错误进入 `Failed`，调用 `cancel()` 进入 `Cancelled`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Planning,
    Fetching,
    Completed,
    AlreadyComplete,
    PartiallyFailed,
    Failed,
    Cancelled,
}

impl DownloadState {
    /// 是否为终止状态。
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DownloadState::Planning | DownloadState::Fetching)
    }
}
