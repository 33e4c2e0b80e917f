use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::download_error::DownloadError;

/// 默认分片大小：1MB
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// 默认重试次数（不含首次尝试）
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// 默认重试延迟（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;

/// 建连与单次读取的超时（毫秒）
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// 分片写盘时每次写入的字节数上限，也是进度上报的粒度
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// 计算本地文件校验和时的读缓冲大小
pub const DEFAULT_HASH_BUFFER_SIZE: usize = 4096;

/// 同时进行的分片请求数上限
pub const DEFAULT_MAX_CONCURRENT_SEGMENTS: usize = 8;

/// 解析真实下载地址的超时（毫秒）
pub const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 10_000;

/// 下载引擎配置。
///
/// 可以直接构造、通过 `DownloadEngine` 的链式方法修改，也可以从 JSON 读取：
/// 缺失的字段取默认值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// 每个分片的大小（字节）
    pub chunk_size: u64,
    /// 分片失败最大重试次数
    pub max_retries: usize,
    /// 重试延迟（毫秒）
    pub retry_delay_ms: u64,
    /// 建连与单次读取的超时（毫秒）
    pub request_timeout_ms: u64,
    /// 每次写盘的字节数上限
    pub read_chunk_size: usize,
    /// 校验和计算的读缓冲大小
    pub hash_buffer_size: usize,
    /// 最大并发分片数
    pub max_concurrent_segments: usize,
    /// 地址解析超时（毫秒）
    pub resolve_timeout_ms: u64,
    /// 是否在目标文件旁记录已完成的分片，用于可靠续传
    pub track_segments: bool,
    /// 自定义 User-Agent
    pub user_agent: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            hash_buffer_size: DEFAULT_HASH_BUFFER_SIZE,
            max_concurrent_segments: DEFAULT_MAX_CONCURRENT_SEGMENTS,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
            track_segments: true,
            user_agent: None,
        }
    }
}

impl DownloadConfig {
    /// 从 JSON 文本读取配置。
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// 开始下载前检查配置；为 0 的尺寸与并发数会让下载无法推进。
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.chunk_size == 0 {
            return Err(DownloadError::InvalidConfig("chunk_size 必须大于 0".into()));
        }
        if self.read_chunk_size == 0 {
            return Err(DownloadError::InvalidConfig("read_chunk_size 必须大于 0".into()));
        }
        if self.hash_buffer_size == 0 {
            return Err(DownloadError::InvalidConfig("hash_buffer_size 必须大于 0".into()));
        }
        if self.max_concurrent_segments == 0 {
            return Err(DownloadError::InvalidConfig(
                "max_concurrent_segments 必须大于 0".into(),
            ));
        }
        Ok(())
    }
}
