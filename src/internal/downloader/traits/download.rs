//! 下载相关 trait：钩子接口，供下载引擎在各阶段调用。

use async_trait::async_trait;

use crate::internal::downloader::structs::DownloadOutcome;

/// 钩子执行时请求中止下载时使用的错误。
#[derive(Debug, Clone)]
pub struct HookAbort;

impl std::fmt::Display for HookAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("下载被钩子中止")
    }
}

impl std::error::Error for HookAbort {}

/// 下载流程钩子：在「开始前 / 进度 / 完成后」插入自定义逻辑。
///
/// 使用方式二选一（可混用）：
/// - **单阶段**：用 `with_before_start_hook` / `with_on_progress_hook` / `with_after_complete_hook` 传入闭包；
/// - **完整钩子**：实现本 trait，通过引擎的 `with_hook` 注册。
///
/// 进度钩子在独立任务里调用，慢速钩子只会让进度合并，不会拖慢分片下载。
#[async_trait]
pub trait DownloadHook: Send + Sync {
    /// 规划开始前调用。返回 `Err` 则中止本次下载。
    async fn before_start(&mut self) -> Result<(), HookAbort> {
        Ok(())
    }

    /// 进度更新（已写入字节数、总大小）。
    fn on_progress(&mut self, _bytes_done: u64, _total: Option<u64>) {}

    /// 任务结束（完成、已完整或部分失败）后调用。
    async fn after_complete(&mut self, _outcome: &DownloadOutcome) {}
}
