use std::path::PathBuf;

/// 重试耗尽、字节没有落盘的分片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSegment {
    pub start: u64,
    /// 结束偏移（包含）
    pub end: u64,
    /// 总尝试次数（首次 + 重试）
    pub attempts: usize,
    /// 最后一次失败的原因
    pub error: String,
}

/// 单次下载的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 所有分片都已写入
    Completed { path: PathBuf, bytes_written: u64 },
    /// 本地文件已完整且校验通过，没有发起任何分片请求
    AlreadyComplete { path: PathBuf },
    /// 部分分片重试耗尽；文件在这些区间留有空洞，不会自动清理
    PartiallyFailed {
        path: PathBuf,
        failed: Vec<FailedSegment>,
    },
}

impl DownloadOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            DownloadOutcome::Completed { path, .. } => path,
            DownloadOutcome::AlreadyComplete { path } => path,
            DownloadOutcome::PartiallyFailed { path, .. } => path,
        }
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self, DownloadOutcome::PartiallyFailed { .. })
    }
}
