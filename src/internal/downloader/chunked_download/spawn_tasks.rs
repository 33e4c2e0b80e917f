//! 分片下载：为每个分片 spawn 任务（信号量限流 + 重试），以及等待所有任务完成并汇总。

use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::internal::downloader::structs::{
    DownloadError, FailedSegment, Segment, SegmentRecord, SegmentStatus,
};

use super::download_one_range::SegmentFetcher;
use super::retry_policy::{RetryOutcome, RetryPolicy};

/// 单个分片任务句柄：(range_start, JoinHandle)。
///
/// 任务返回 `Err` 表示致命错误（本地 I/O、取消等），整个下载随之终止；
/// 重试耗尽的分片以 `Ok` 返回，状态为 [`SegmentStatus::Failed`]。
pub type RangeTaskHandle = (u64, JoinHandle<Result<SegmentReport, DownloadError>>);

/// 分片任务结束时的报告。
#[derive(Debug)]
pub struct SegmentReport {
    pub segment: Segment,
    /// 重试耗尽时最后一次的错误
    pub last_error: Option<String>,
}

/// 生成并 spawn 分片任务时的参数（形参超过 3 个，用 struct 承载）。
pub struct SpawnRangeTasksParams {
    pub segments: Vec<Segment>,
    pub fetcher: Arc<SegmentFetcher>,
    pub retry: RetryPolicy,
    pub semaphore: Arc<Semaphore>,
    /// 启用分片记录时，每完成一个分片就更新并落盘
    pub record: Option<Arc<Mutex<SegmentRecord>>>,
    pub destination: PathBuf,
}

/// 为每个分片 spawn 一个任务，返回任务句柄列表。
pub fn spawn_range_tasks(params: SpawnRangeTasksParams) -> Vec<RangeTaskHandle> {
    let mut handles = Vec::with_capacity(params.segments.len());
    for segment in params.segments {
        let start = segment.start;
        let fetcher = Arc::clone(&params.fetcher);
        let sem = Arc::clone(&params.semaphore);
        let record = params.record.clone();
        let destination = params.destination.clone();
        let retry = params.retry;

        let handle = tokio::spawn(async move {
            let cancel = fetcher.cancel.clone();
            let _permit = tokio::select! {
                _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
                permit = sem.acquire_owned() => permit
                    .map_err(|_| DownloadError::ChunkedInternal("semaphore closed".into()))?,
            };
            let result =
                run_one_segment(segment, &fetcher, retry, record.as_deref(), &destination).await;
            if matches!(&result, Err(e) if !matches!(e, DownloadError::Cancelled)) {
                // 本地 I/O 等致命错误：其余分片不可能再成功，立即通知它们停止
                cancel.cancel();
            }
            result
        });
        handles.push((start, handle));
    }
    handles
}

async fn run_one_segment(
    mut segment: Segment,
    fetcher: &SegmentFetcher,
    retry: RetryPolicy,
    record: Option<&Mutex<SegmentRecord>>,
    destination: &std::path::Path,
) -> Result<SegmentReport, DownloadError> {
    segment.status = SegmentStatus::InFlight;
    debug!(index = segment.index, range = %segment.range_header_from(segment.start), "分片开始");

    let offset = AtomicU64::new(segment.start);
    let seg = &segment;
    let off = &offset;
    let outcome = retry
        .run(&fetcher.cancel, |_attempt| fetcher.download_one_range(seg, off))
        .await;

    match outcome {
        RetryOutcome::Succeeded { attempts, .. } => {
            segment.retry_count = attempts - 1;
            segment.status = SegmentStatus::Completed;
            if let Some(record) = record {
                // 持锁落盘，临时文件不会被并发覆盖
                let mut guard = record.lock().await;
                guard.mark_completed(segment.start, segment.end);
                guard.save(destination).await?;
            }
            Ok(SegmentReport {
                segment,
                last_error: None,
            })
        }
        RetryOutcome::Exhausted {
            attempts,
            last_error,
        } => {
            segment.retry_count = attempts.saturating_sub(1);
            segment.status = SegmentStatus::Failed;
            error!(
                "Chunk {}-{} failed after {} retries: {}",
                segment.start, segment.end, segment.retry_count, last_error
            );
            Ok(SegmentReport {
                segment,
                last_error: Some(last_error.to_string()),
            })
        }
        RetryOutcome::Aborted { error, .. } => Err(error),
    }
}

/// 所有分片任务的汇总结果。
#[derive(Debug, Default)]
pub struct JoinedSegments {
    pub completed: Vec<Segment>,
    pub failed: Vec<FailedSegment>,
}

/// 等待全部分片任务完成并汇总。
///
/// 任一任务返回致命错误时取消其余分片，等它们退出后返回第一个错误；
/// 用户取消时各任务都以 [`DownloadError::Cancelled`] 结束。
pub async fn join_range_handles(
    handles: Vec<RangeTaskHandle>,
    cancel: &CancellationToken,
) -> Result<JoinedSegments, DownloadError> {
    let mut joined = JoinedSegments::default();
    let mut fatal: Option<DownloadError> = None;

    for (_start, h) in handles {
        let result = match h.await {
            Ok(r) => r,
            Err(join_err) => Err(DownloadError::TaskJoin(join_err)),
        };
        match result {
            Ok(report) => match report.segment.status {
                SegmentStatus::Failed => joined.failed.push(FailedSegment {
                    start: report.segment.start,
                    end: report.segment.end,
                    attempts: report.segment.retry_count + 1,
                    error: report.last_error.unwrap_or_default(),
                }),
                _ => joined.completed.push(report.segment),
            },
            Err(e) => {
                if fatal.is_none() {
                    if !matches!(e, DownloadError::Cancelled) {
                        error!(error = %e, "分片致命错误，取消其余分片");
                    }
                    cancel.cancel();
                    fatal = Some(e);
                } else if matches!(fatal, Some(DownloadError::Cancelled))
                    && !matches!(e, DownloadError::Cancelled)
                {
                    // 取消引发的连锁错误之外，真正的故障优先返回
                    fatal = Some(e);
                }
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(joined),
    }
}
