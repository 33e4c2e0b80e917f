//! 分片规划：把 `[start, total)` 切成不超过 `chunk_size` 的连续区间。纯函数，无 I/O。

use crate::internal::downloader::structs::{DownloadError, Segment};

/// 从 `start` 到 `total - 1` 按 `chunk_size` 生成分片，按起始偏移升序。
///
/// `start == total` 时返回空列表；`chunk_size == 0` 或 `start > total` 返回 [`DownloadError::InvalidRange`]。
pub fn plan_ranges(
    total: u64,
    start: u64,
    chunk_size: u64,
) -> Result<Vec<Segment>, DownloadError> {
    if chunk_size == 0 || start > total {
        return Err(DownloadError::InvalidRange {
            total,
            start,
            chunk_size,
        });
    }

    let count = (total - start).div_ceil(chunk_size);
    let mut segments = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
    let mut offset = start;
    while offset < total {
        let end = offset.saturating_add(chunk_size).min(total) - 1;
        segments.push(Segment::new(segments.len(), offset, end));
        offset = end + 1;
    }
    Ok(segments)
}
