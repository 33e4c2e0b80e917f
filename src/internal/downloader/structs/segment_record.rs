//! 分片完成记录：与目标文件同目录的 `<文件名>.segments.json`。
//!
//! 分片乱序完成，文件又是预分配的，单看文件长度分不出哪里有空洞；
//! 续传时以这份记录里「从 0 开始连续完成」的长度为准。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use super::download_error::DownloadError;

const RECORD_SUFFIX: &str = ".segments.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// 记录所对应的远程文件大小
    pub total_size: u64,
    /// 已完成的区间 `[start, end]`，按 start 升序且已合并
    pub completed: Vec<(u64, u64)>,
}

impl SegmentRecord {
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            completed: Vec::new(),
        }
    }

    /// 前 `prefix` 字节已完成的记录，用于续传开始时写入初始状态。
    pub fn with_prefix(total_size: u64, prefix: u64) -> Self {
        let mut record = Self::new(total_size);
        if prefix > 0 {
            record.mark_completed(0, prefix - 1);
        }
        record
    }

    /// 记录文件路径：在目标文件名后追加 `.segments.json`。
    pub fn path_for(destination: &Path) -> PathBuf {
        let mut name: OsString = destination.as_os_str().to_owned();
        name.push(RECORD_SUFFIX);
        PathBuf::from(name)
    }

    /// 标记 `[start, end]` 已完成，与相邻或重叠的区间合并。
    pub fn mark_completed(&mut self, start: u64, end: u64) {
        self.completed.push((start, end));
        self.completed.sort_unstable_by_key(|&(s, _)| s);

        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(self.completed.len());
        for &(s, e) in &self.completed {
            match merged.last_mut() {
                Some(last) if s <= last.1.saturating_add(1) => last.1 = last.1.max(e),
                _ => merged.push((s, e)),
            }
        }
        self.completed = merged;
    }

    /// 从偏移 0 开始连续完成的字节数。
    pub fn contiguous_prefix(&self) -> u64 {
        match self.completed.first() {
            Some(&(0, end)) => (end + 1).min(self.total_size),
            _ => 0,
        }
    }

    /// 读取记录；文件不存在时返回 `None`。
    pub async fn load(destination: &Path) -> Result<Option<Self>, DownloadError> {
        let path = Self::path_for(destination);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DownloadError::SegmentRecord(e)),
        }
    }

    /// 先写临时文件再 rename，中途崩溃不会留下半截 JSON。
    pub async fn save(&self, destination: &Path) -> Result<(), DownloadError> {
        let path = Self::path_for(destination);
        let mut tmp_name: OsString = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let bytes = serde_json::to_vec(self)?;
        fs::write(&tmp, bytes)
            .await
            .map_err(DownloadError::SegmentRecord)?;
        fs::rename(&tmp, &path)
            .await
            .map_err(DownloadError::SegmentRecord)?;
        Ok(())
    }

    /// 删除记录；不存在时视为成功。
    pub async fn remove(destination: &Path) -> Result<(), DownloadError> {
        match fs::remove_file(Self::path_for(destination)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DownloadError::SegmentRecord(e)),
        }
    }
}
