//! 进度聚合：所有分片共享一个实例，把各自写入的字节数累加到同一份进度上。

use crate::internal::downloader::structs::DownloadProgress;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

/// 单个下载任务的进度聚合器。
///
/// 内部是一份 [`UnlockReactiveProperty<DownloadProgress>`]，`report` 在通道锁内完成「读-加-发布」，
/// 因此并发上报不会丢失，发布出去的 `bytes_done` 单调不减。
/// 监听者只看到最新值，不会反压上报方。
#[derive(Clone, Debug)]
pub struct ProgressAggregator {
    property: UnlockReactiveProperty<DownloadProgress>,
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressAggregator {
    /// 总大小未知、已写入 0 字节。
    pub fn new() -> Self {
        Self {
            property: UnlockReactiveProperty::new(DownloadProgress::default()),
        }
    }

    /// 规划完成后设置总大小与已在本地的字节数（续传起点）。
    pub fn begin(&self, total: u64, already_done: u64) {
        self.property.update_field(|p| {
            p.total = Some(total);
            p.bytes_done = p.bytes_done.max(already_done);
        });
    }

    /// 累加 `delta` 字节并通知监听者，返回累加后的已写入字节数。
    pub fn report(&self, delta: u64) -> u64 {
        self.property
            .update_field(|p| {
                p.bytes_done += delta;
                p.bytes_done
            })
            .unwrap_or(0)
    }

    /// 当前进度百分比；总大小未知或为 0 时为 `NaN`。
    pub fn snapshot(&self) -> f64 {
        self.progress().pct()
    }

    pub fn bytes_done(&self) -> u64 {
        self.progress().bytes_done
    }

    pub fn progress(&self) -> DownloadProgress {
        self.property.get_or_default()
    }

    /// 底层响应式属性，可 `.watch()` 监听。
    pub fn property(&self) -> &UnlockReactiveProperty<DownloadProgress> {
        &self.property
    }
}
