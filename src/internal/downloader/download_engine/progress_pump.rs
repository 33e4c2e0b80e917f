//! 进度钩子转发：监听进度属性，把每次变化交给 on_progress 钩子。

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::internal::downloader::chunked_download::ProgressAggregator;
use crate::internal::downloader::structs::DownloadHooksContainer;

/// 在独立任务里执行进度钩子，分片上报进度时不等待钩子。
pub(crate) struct ProgressPump {
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl ProgressPump {
    pub(crate) fn spawn(
        runtime: &Handle,
        progress: &ProgressAggregator,
        hooks: Arc<Mutex<DownloadHooksContainer>>,
    ) -> Self {
        let mut watcher = progress.property().watch();
        let stop = CancellationToken::new();
        let stopped = stop.clone();

        let task = runtime.spawn(async move {
            loop {
                // 未读的变化先于停止信号处理
                let p = tokio::select! {
                    biased;
                    changed = watcher.changed() => match changed {
                        Ok(p) => p,
                        Err(_) => break,
                    },
                    _ = stopped.cancelled() => break,
                };
                hooks.lock().await.run_on_progress(p.bytes_done, p.total);
            }
        });

        Self { stop, task }
    }

    /// 停止转发并等待转发任务退出，返回前最后一次进度已交给钩子。
    pub(crate) async fn finish(self) {
        self.stop.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "进度钩子任务异常退出");
        }
    }
}
