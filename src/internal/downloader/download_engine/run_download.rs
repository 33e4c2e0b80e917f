//! 下载任务主体：解析地址 → 元数据 → 续传判断 → 规划分片 → 并发下载 → 汇总结果。

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::internal::downloader::chunked_download::{
    fetch_remote_metadata, join_range_handles, plan_ranges, spawn_range_tasks,
    ProgressAggregator, ResumeDecision, ResumeVerifier, RetryPolicy, SegmentFetcher,
    SpawnRangeTasksParams,
};
use crate::internal::downloader::structs::{
    DownloadConfig, DownloadError, DownloadHooksContainer, DownloadOutcome, DownloadState,
    DownloadTask, SegmentRecord,
};
use crate::internal::resolver::{ResolveError, UrlResolver};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::progress_pump::ProgressPump;

/// 执行下载任务时的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct RunDownloadParams {
    pub client: Client,
    pub url: String,
    pub destination: PathBuf,
    pub config: DownloadConfig,
    pub resolver: Arc<dyn UrlResolver>,
    pub hooks: Arc<Mutex<DownloadHooksContainer>>,
    pub progress: ProgressAggregator,
    pub state: UnlockReactiveProperty<DownloadState>,
    pub cancel: CancellationToken,
}

/// 执行下载并把结果写入状态。
pub(crate) async fn run_download(
    params: RunDownloadParams,
    mut pump: Option<ProgressPump>,
) -> Result<DownloadOutcome, DownloadError> {
    let state = params.state.clone();
    let result = execute(params, &mut pump).await;
    stop_pump(&mut pump).await;

    let final_state = match &result {
        Ok(DownloadOutcome::Completed { .. }) => DownloadState::Completed,
        Ok(DownloadOutcome::AlreadyComplete { .. }) => DownloadState::AlreadyComplete,
        Ok(DownloadOutcome::PartiallyFailed { .. }) => DownloadState::PartiallyFailed,
        Err(DownloadError::Cancelled) => DownloadState::Cancelled,
        Err(_) => DownloadState::Failed,
    };
    match &result {
        Err(DownloadError::Cancelled) => info!("下载已取消"),
        Err(e) => error!("Download failed: {e}"),
        Ok(_) => {}
    }
    state.update(final_state);
    result
}

/// 停止进度钩子转发；after_complete 之后不会再有 on_progress。
async fn stop_pump(pump: &mut Option<ProgressPump>) {
    if let Some(p) = pump.take() {
        p.finish().await;
    }
}

/// 规划阶段的每一步都可以被取消。
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, DownloadError>>,
) -> Result<T, DownloadError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DownloadError::Cancelled),
        r = fut => r,
    }
}

/// 解析真实地址；失败或超时记录错误并回退到原始地址。
async fn resolve_with_fallback(resolver: &dyn UrlResolver, url: &str, timeout: Duration) -> String {
    let result = match tokio::time::timeout(timeout, resolver.resolve(url)).await {
        Ok(r) => r,
        Err(_) => Err(ResolveError::Timeout(timeout)),
    };
    match result {
        Ok(resolved) => {
            if resolved != url {
                info!(from = url, to = %resolved, "下载地址已解析");
            }
            resolved
        }
        Err(e) => {
            error!("Error resolving URL: {e}");
            url.to_string()
        }
    }
}

async fn execute(
    params: RunDownloadParams,
    pump: &mut Option<ProgressPump>,
) -> Result<DownloadOutcome, DownloadError> {
    let RunDownloadParams {
        client,
        url,
        destination,
        config,
        resolver,
        hooks,
        progress,
        state,
        cancel,
    } = params;

    hooks.lock().await.run_before_start().await?;

    let url = until_cancelled(&cancel, async {
        Ok(resolve_with_fallback(resolver.as_ref(), &url, config.resolve_timeout()).await)
    })
    .await?;

    let metadata = until_cancelled(&cancel, fetch_remote_metadata(&client, &url)).await?;
    let total = metadata.total_size;
    if metadata.accepts_ranges == Some(false) {
        warn!(url = %url, "服务器声明不支持 Range 请求");
    }

    let verifier = ResumeVerifier::new(config.hash_buffer_size)
        .with_segment_record(config.track_segments);
    let decision = until_cancelled(&cancel, verifier.decide(&destination, &metadata)).await?;

    if decision == ResumeDecision::AlreadyComplete {
        info!(path = %destination.display(), "文件已完整且校验通过");
        progress.begin(total, total);
        if config.track_segments {
            SegmentRecord::remove(&destination).await?;
        }
        let outcome = DownloadOutcome::AlreadyComplete { path: destination };
        stop_pump(pump).await;
        hooks.lock().await.run_after_complete(&outcome).await;
        return Ok(outcome);
    }

    let start = until_cancelled(&cancel, verifier.prepare(&destination, total, decision)).await?;
    progress.begin(total, start);

    let task = DownloadTask {
        url,
        destination,
        total_size: total,
        chunk_size: config.chunk_size,
        start_offset: start,
    };
    let segments = plan_ranges(task.total_size, task.start_offset, task.chunk_size)?;
    info!(
        url = %task.url,
        total = task.total_size,
        start = task.start_offset,
        segments = segments.len(),
        "开始分片下载"
    );
    state.update(DownloadState::Fetching);

    // 分片致命错误只中止本任务的分片，不影响句柄上的用户取消标记
    let abort = cancel.child_token();

    let record = config
        .track_segments
        .then(|| Arc::new(Mutex::new(SegmentRecord::with_prefix(total, start))));
    let fetcher = Arc::new(SegmentFetcher {
        client,
        url: task.url.clone(),
        destination: task.destination.clone(),
        total,
        read_chunk_size: config.read_chunk_size,
        progress: progress.clone(),
        cancel: abort.clone(),
    });

    let handles = spawn_range_tasks(SpawnRangeTasksParams {
        segments,
        fetcher,
        retry: RetryPolicy::from_config(&config),
        semaphore: Arc::new(Semaphore::new(config.max_concurrent_segments)),
        record,
        destination: task.destination.clone(),
    });
    let joined = join_range_handles(handles, &abort).await?;

    let outcome = if joined.failed.is_empty() {
        if config.track_segments {
            SegmentRecord::remove(&task.destination).await?;
        }
        let bytes_written = task.remaining();
        info!(path = %task.destination.display(), bytes = bytes_written, "下载完成");
        DownloadOutcome::Completed {
            path: task.destination,
            bytes_written,
        }
    } else {
        error!(
            "Download of {} incomplete: {} of {} segments failed",
            task.destination.display(),
            joined.failed.len(),
            joined.failed.len() + joined.completed.len()
        );
        DownloadOutcome::PartiallyFailed {
            path: task.destination,
            failed: joined.failed,
        }
    };

    stop_pump(pump).await;
    hooks.lock().await.run_after_complete(&outcome).await;
    Ok(outcome)
}
