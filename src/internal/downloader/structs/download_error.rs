//! 下载相关错误类型。

use reqwest::StatusCode;
use thiserror::Error;

use crate::internal::downloader::traits::download::HookAbort;
use crate::internal::filename::FilenameError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL 无效: {0}")]
    InvalidUrl(String),

    #[error("服务器返回意外状态码 {status}")]
    UnexpectedStatus { status: StatusCode },

    #[error("服务器不支持 Range 请求")]
    RangeNotSupported,

    #[error("响应体长度不符：期望 {expected} 字节，实际 {actual} 字节")]
    BodyLengthMismatch { expected: u64, actual: u64 },

    /// 远程未返回 Content-Length 或为 0，无法规划分片。
    #[error("远程文件大小未知或为 0")]
    UnknownFileSize,

    #[error("无效的分片参数: total={total}, start={start}, chunk_size={chunk_size}")]
    InvalidRange {
        total: u64,
        start: u64,
        chunk_size: u64,
    },

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    #[error("创建文件失败: {0}")]
    CreateFile(std::io::Error),

    #[error("打开文件失败: {0}")]
    OpenFile(std::io::Error),

    #[error("读取文件失败: {0}")]
    ReadFile(std::io::Error),

    #[error("写入文件失败: {0}")]
    WriteFile(std::io::Error),

    #[error("文件定位失败: {0}")]
    SeekFile(std::io::Error),

    #[error("刷新文件失败: {0}")]
    FlushFile(std::io::Error),

    #[error("预分配文件空间失败: {0}")]
    PreallocateFile(std::io::Error),

    #[error("分片记录读写失败: {0}")]
    SegmentRecord(std::io::Error),

    #[error("分片记录格式错误: {0}")]
    SegmentRecordFormat(#[from] serde_json::Error),

    #[error("下载被取消")]
    Cancelled,

    #[error("必须在 tokio 运行时中启动下载")]
    NoRuntime,

    #[error("分片任务失败: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("分片下载内部错误: {0}")]
    ChunkedInternal(String),

    #[error("无法确定文件名: {0}")]
    Filename(#[from] FilenameError),

    /// 钩子在 before_start 中返回错误，中止下载。
    #[error("{0}")]
    HookAbort(#[from] HookAbort),
}

impl DownloadError {
    /// 是否属于可重试的传输层错误。
    ///
    /// 网络错误、意外状态码、响应体长短不符交给重试策略；
    /// 本地 I/O、参数与配置错误重试也不会成功，直接视为整个任务失败。
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Request(e) => !e.is_builder(),
            DownloadError::UnexpectedStatus { .. } => true,
            DownloadError::BodyLengthMismatch { .. } => true,
            _ => false,
        }
    }
}
