//! 分片：目标文件中一段连续的字节区间，独立下载、独立写盘。

/// 分片当前所处的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    Pending,
    InFlight,
    Completed,
    Failed,
}

/// 一个分片：`[start, end]`，两端都包含。
///
/// 同一任务内的分片互不重叠，按 `start` 升序覆盖 `[起始偏移, total - 1]`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 分片序号（从 0 开始）
    pub index: usize,
    /// 起始字节偏移
    pub start: u64,
    /// 结束字节偏移（包含）
    pub end: u64,
    pub status: SegmentStatus,
    /// 已经重试的次数（首次尝试不计）
    pub retry_count: usize,
}

impl Segment {
    pub fn new(index: usize, start: u64, end: u64) -> Self {
        Self {
            index,
            start,
            end,
            status: SegmentStatus::Pending,
            retry_count: 0,
        }
    }

    /// 分片字节数。
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// 从 `offset` 开始到分片末尾的 Range 头：`bytes=offset-end`。
    pub fn range_header_from(&self, offset: u64) -> String {
        format!("bytes={}-{}", offset, self.end)
    }
}
