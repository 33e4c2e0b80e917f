//! 分片下载：断点续传：根据本地文件、分片记录与远程元数据，决定续传、重下或已完整。

use std::path::Path;

use md5::Md5;
use sha2::{Digest, Sha256};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::internal::downloader::structs::download_config::DEFAULT_HASH_BUFFER_SIZE;
use crate::internal::downloader::structs::{
    ContentChecksum, DownloadError, RemoteMetadata, SegmentRecord,
};

/// 续传检查结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// 从 0 开始：目标文件会被截断并预分配到远程大小
    RestartFromZero,
    /// 前 `start` 字节已在本地，从这里继续
    ResumeFrom { start: u64 },
    /// 本地文件完整且校验通过，不需要任何网络请求
    AlreadyComplete,
}

/// 续传判断器。
///
/// | 本地文件 | 与远程大小 | 校验和 | 结果 |
/// |---|---|---|---|
/// | 不存在 | - | - | 从 0 重下 |
/// | 存在 | 已有 < 远程 | - | 从已有处续传 |
/// | 存在 | 已有 ≥ 远程 | 有且一致 | 已完整 |
/// | 存在 | 已有 ≥ 远程 | 没有或不一致 | 从 0 重下 |
///
/// 启用分片记录时，「已有」取记录中从 0 开始连续完成的长度；记录里的总大小与远程不符时直接重下。
#[derive(Debug, Clone, Copy)]
pub struct ResumeVerifier {
    hash_buffer_size: usize,
    use_segment_record: bool,
}

impl Default for ResumeVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_BUFFER_SIZE)
    }
}

impl ResumeVerifier {
    pub fn new(hash_buffer_size: usize) -> Self {
        Self {
            hash_buffer_size,
            use_segment_record: true,
        }
    }

    /// 是否参考分片完成记录。
    pub fn with_segment_record(mut self, enabled: bool) -> Self {
        self.use_segment_record = enabled;
        self
    }

    /// 只读判断，不修改任何文件；同样的输入重复调用得到同样的结果。
    ///
    /// 「已有 ≥ 远程」分支会先完整读一遍本地文件计算校验和，再返回。
    pub async fn decide(
        &self,
        destination: &Path,
        metadata: &RemoteMetadata,
    ) -> Result<ResumeDecision, DownloadError> {
        let total = metadata.total_size;
        let local_len = match fs::metadata(destination).await {
            Ok(m) => m.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResumeDecision::RestartFromZero);
            }
            Err(e) => return Err(DownloadError::OpenFile(e)),
        };

        let existing = if self.use_segment_record {
            let record = match SegmentRecord::load(destination).await {
                Ok(record) => record,
                Err(DownloadError::SegmentRecordFormat(e)) => {
                    warn!(error = %e, "分片记录损坏，重新下载");
                    return Ok(ResumeDecision::RestartFromZero);
                }
                Err(e) => return Err(e),
            };
            match record {
                Some(record) if record.total_size == total => record.contiguous_prefix().min(local_len),
                Some(record) => {
                    debug!(
                        recorded = record.total_size,
                        remote = total,
                        "分片记录与远程大小不符"
                    );
                    return Ok(ResumeDecision::RestartFromZero);
                }
                None => local_len,
            }
        } else {
            local_len
        };

        if existing < total {
            return Ok(ResumeDecision::ResumeFrom { start: existing });
        }

        let Some(remote) = metadata.checksum.as_ref() else {
            return Ok(ResumeDecision::RestartFromZero);
        };
        let local = compute_file_checksum(destination, remote, self.hash_buffer_size).await?;
        if &local == remote {
            Ok(ResumeDecision::AlreadyComplete)
        } else {
            info!(local = %local, remote = %remote, "本地文件校验和不一致，重新下载");
            Ok(ResumeDecision::RestartFromZero)
        }
    }

    /// 按判断结果准备目标文件，返回下载起点。
    ///
    /// 先写初始分片记录，再扩展文件；预分配后中途崩溃也不会被误认为已完整。
    pub async fn prepare(
        &self,
        destination: &Path,
        total: u64,
        decision: ResumeDecision,
    ) -> Result<u64, DownloadError> {
        let start = match decision {
            ResumeDecision::AlreadyComplete => return Ok(total),
            ResumeDecision::RestartFromZero => 0,
            ResumeDecision::ResumeFrom { start } => start,
        };

        if self.use_segment_record {
            SegmentRecord::with_prefix(total, start)
                .save(destination)
                .await?;
        }

        let file = match decision {
            ResumeDecision::RestartFromZero => File::create(destination)
                .await
                .map_err(DownloadError::CreateFile)?,
            _ => OpenOptions::new()
                .write(true)
                .open(destination)
                .await
                .map_err(DownloadError::OpenFile)?,
        };
        file.set_len(total)
            .await
            .map_err(DownloadError::PreallocateFile)?;

        Ok(start)
    }
}

/// 用与 `expected` 相同的算法流式计算本地文件的校验和。
pub async fn compute_file_checksum(
    path: &Path,
    expected: &ContentChecksum,
    buffer_size: usize,
) -> Result<ContentChecksum, DownloadError> {
    let mut file = File::open(path).await.map_err(DownloadError::OpenFile)?;
    let mut buf = vec![0u8; buffer_size.max(1)];
    match expected {
        ContentChecksum::Md5(_) => {
            let digest = hash_file::<Md5>(&mut file, &mut buf).await?;
            Ok(ContentChecksum::Md5(digest))
        }
        ContentChecksum::Sha256(_) => {
            let digest = hash_file::<Sha256>(&mut file, &mut buf).await?;
            Ok(ContentChecksum::Sha256(digest))
        }
    }
}

async fn hash_file<D: Digest>(file: &mut File, buf: &mut [u8]) -> Result<Vec<u8>, DownloadError> {
    let mut hasher = D::new();
    loop {
        let n = file.read(buf).await.map_err(DownloadError::ReadFile)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}
