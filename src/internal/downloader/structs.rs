pub mod download_config;
pub mod download_error;
pub mod download_hooks_container;
pub mod download_progress;
pub mod download_result;
pub mod download_state;
pub mod download_task;
pub(crate) mod hook_adapters;
pub mod remote_metadata;
pub mod segment;
pub mod segment_record;

// 重导出公共类型
pub use download_config::DownloadConfig;
pub use download_error::DownloadError;
pub use download_hooks_container::DownloadHooksContainer;
pub use download_progress::DownloadProgress;
pub use download_result::{DownloadOutcome, FailedSegment};
pub use download_state::DownloadState;
pub use download_task::DownloadTask;
pub use remote_metadata::{ContentChecksum, RemoteMetadata};
pub use segment::{Segment, SegmentStatus};
pub use segment_record::SegmentRecord;
