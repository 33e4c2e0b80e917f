//! 重试策略测试：使用暂停的 tokio 时钟，验证次数与间隔。

use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::downloader::{DownloadError, RetryOutcome, RetryPolicy};

fn transient() -> DownloadError {
    DownloadError::UnexpectedStatus {
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[tokio::test(start_paused = true)]
async fn always_failing_segment_is_attempted_four_times() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts(), 4);
    assert_eq!(policy.delay, Duration::from_secs(5));

    let cancel = CancellationToken::new();
    let mut times = Vec::new();
    let outcome: RetryOutcome<()> = policy
        .run(&cancel, |_attempt| {
            times.push(Instant::now());
            async { Err(transient()) }
        })
        .await;

    match outcome {
        RetryOutcome::Exhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 4);
            assert!(last_error.is_retryable());
        }
        other => panic!("预期重试耗尽，得到 {other:?}"),
    }

    assert_eq!(times.len(), 4);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(5));
    }
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_transient_failures() {
    let policy = RetryPolicy::new(3, Duration::from_millis(100));
    let cancel = CancellationToken::new();

    let outcome = policy
        .run(&cancel, |attempt| async move {
            if attempt < 3 {
                Err(transient())
            } else {
                Ok(attempt * 10)
            }
        })
        .await;

    assert!(matches!(
        outcome,
        RetryOutcome::Succeeded {
            value: 30,
            attempts: 3
        }
    ));
}

#[tokio::test]
async fn fatal_error_is_not_retried() {
    let policy = RetryPolicy::new(3, Duration::from_secs(60));
    let cancel = CancellationToken::new();
    let mut calls = 0;

    let outcome: RetryOutcome<()> = policy
        .run(&cancel, |_| {
            calls += 1;
            async {
                Err(DownloadError::WriteFile(std::io::Error::other("磁盘已满")))
            }
        })
        .await;

    assert_eq!(calls, 1);
    assert!(matches!(
        outcome,
        RetryOutcome::Aborted {
            attempts: 1,
            error: DownloadError::WriteFile(_)
        }
    ));
}

#[tokio::test]
async fn cancel_interrupts_retry_delay() {
    let policy = RetryPolicy::new(3, Duration::from_secs(3600));
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let outcome: RetryOutcome<()> = tokio::time::timeout(
        Duration::from_secs(5),
        policy.run(&cancel, |_| async { Err(transient()) }),
    )
    .await
    .expect("取消后应立即返回");

    assert!(matches!(
        outcome,
        RetryOutcome::Aborted {
            attempts: 1,
            error: DownloadError::Cancelled
        }
    ));
}

#[test]
fn zero_retries_means_single_attempt() {
    let policy = RetryPolicy::new(0, Duration::ZERO);
    assert_eq!(policy.max_attempts(), 1);
}
