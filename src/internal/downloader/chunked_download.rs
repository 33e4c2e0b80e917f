mod chunk_handler;
mod download_one_range;
mod metadata;
pub mod progress_aggregator;
pub mod range_planner;
mod range_request;
pub mod resume;
pub mod retry_policy;
mod spawn_tasks;

pub use download_one_range::SegmentFetcher;
pub use metadata::fetch_remote_metadata;
pub use progress_aggregator::ProgressAggregator;
pub use range_planner::plan_ranges;
pub use resume::{compute_file_checksum, ResumeDecision, ResumeVerifier};
pub use retry_policy::{RetryOutcome, RetryPolicy};
pub(crate) use spawn_tasks::{
    join_range_handles, spawn_range_tasks, JoinedSegments, SpawnRangeTasksParams,
};
