//! 分片下载：执行单段 Range 下载的一次尝试：请求、流式读块、定位写文件、上报进度。

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::downloader::structs::{DownloadError, Segment};

use super::chunk_handler::{handle_one_chunk, HandleOneChunkParams};
use super::progress_aggregator::ProgressAggregator;
use super::range_request::{fetch_range_response, FetchRangeParams};

/// 分片下载器：同一任务的所有分片共用一个实例。
///
/// 每次尝试都单独打开目标文件（不截断），定位到分片内的写入位置后顺序写入，
/// 不会触碰分片区间以外的字节。是否重试由外层 [`RetryPolicy`](super::RetryPolicy) 决定。
#[derive(Debug, Clone)]
pub struct SegmentFetcher {
    pub client: Client,
    pub url: String,
    pub destination: PathBuf,
    /// 文件总大小，用作进度分母
    pub total: u64,
    pub read_chunk_size: usize,
    pub progress: ProgressAggregator,
    pub cancel: CancellationToken,
}

impl SegmentFetcher {
    /// 一次尝试：从 `offset` 写到分片末尾。
    ///
    /// `offset` 随写入推进，失败重试时从已写到的位置继续请求，已上报的进度不会重复计算。
    pub async fn download_one_range(
        &self,
        segment: &Segment,
        offset: &AtomicU64,
    ) -> Result<(), DownloadError> {
        let start_at = offset.load(Ordering::Relaxed);
        if start_at > segment.end {
            return Ok(());
        }
        let expected = segment.end - start_at + 1;

        let resp = fetch_range_response(FetchRangeParams {
            client: &self.client,
            url: &self.url,
            segment,
            offset: start_at,
            total: self.total,
        })
        .await?;

        if let Some(len) = resp.content_length().filter(|&len| len != expected) {
            return Err(DownloadError::BodyLengthMismatch {
                expected,
                actual: len,
            });
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.destination)
            .await
            .map_err(DownloadError::OpenFile)?;
        file.seek(std::io::SeekFrom::Start(start_at))
            .await
            .map_err(DownloadError::SeekFile)?;

        let streamed = self.stream_body(resp, &mut file, offset, expected).await;
        // 无论成败都刷盘，保证下一次尝试开始前本次写入已落地
        let flushed = file.flush().await.map_err(DownloadError::FlushFile);
        streamed?;
        flushed?;

        debug!(
            index = segment.index,
            start = segment.start,
            end = segment.end,
            "分片写入完成"
        );
        Ok(())
    }

    async fn stream_body(
        &self,
        resp: Response,
        file: &mut File,
        offset: &AtomicU64,
        expected: u64,
    ) -> Result<(), DownloadError> {
        let mut stream = resp.bytes_stream();
        let mut received: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(DownloadError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            received += chunk.len() as u64;
            if received > expected {
                // 多出来的数据不写，已写部分仍在分片区间内
                return Err(DownloadError::BodyLengthMismatch {
                    expected,
                    actual: received,
                });
            }

            handle_one_chunk(HandleOneChunkParams {
                chunk,
                file: &mut *file,
                file_offset: offset,
                read_chunk_size: self.read_chunk_size,
                progress: &self.progress,
            })
            .await?;
        }

        if received < expected {
            return Err(DownloadError::BodyLengthMismatch {
                expected,
                actual: received,
            });
        }
        Ok(())
    }
}
