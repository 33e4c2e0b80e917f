use std::path::PathBuf;

/// 一次下载任务：规划开始后不再变化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// 实际请求的地址（已经过解析）
    pub url: String,
    pub destination: PathBuf,
    /// 远程文件总大小（字节）
    pub total_size: u64,
    pub chunk_size: u64,
    /// 从哪个偏移开始下载；之前的字节已在本地
    pub start_offset: u64,
}

impl DownloadTask {
    /// 本次需要下载的字节数。
    pub fn remaining(&self) -> u64 {
        self.total_size.saturating_sub(self.start_offset)
    }
}
