//! 分片下载：处理响应体里的一块数据：按读块大小写文件、推进偏移、上报进度。

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::internal::downloader::structs::DownloadError;

use super::progress_aggregator::ProgressAggregator;

/// 处理单块数据时的参数（形参超过 3 个，用 struct 承载）。
pub struct HandleOneChunkParams<'a> {
    pub chunk: bytes::Bytes,
    /// 已定位到 `file_offset` 的文件句柄
    pub file: &'a mut File,
    pub file_offset: &'a AtomicU64,
    pub read_chunk_size: usize,
    pub progress: &'a ProgressAggregator,
}

/// 把一块数据按 `read_chunk_size` 切开依次写入，每写完一段就推进偏移并上报进度。
pub async fn handle_one_chunk(params: HandleOneChunkParams<'_>) -> Result<(), DownloadError> {
    for piece in params.chunk.chunks(params.read_chunk_size) {
        params
            .file
            .write_all(piece)
            .await
            .map_err(DownloadError::WriteFile)?;
        let len = piece.len() as u64;
        params.file_offset.fetch_add(len, Ordering::Relaxed);
        params.progress.report(len);
    }
    Ok(())
}
