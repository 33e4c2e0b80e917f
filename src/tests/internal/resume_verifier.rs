//! 续传判断测试：决策表、幂等性、分片记录、文件准备。

use md5::{Digest, Md5};
use sha2::Sha256;

use crate::downloader::{
    compute_file_checksum, plan_ranges, ContentChecksum, RemoteMetadata, ResumeDecision,
    ResumeVerifier, SegmentRecord,
};
use crate::tests::random_bytes;

fn metadata(total: u64, checksum: Option<ContentChecksum>) -> RemoteMetadata {
    RemoteMetadata {
        total_size: total,
        checksum,
        accepts_ranges: Some(true),
    }
}

fn md5_of(data: &[u8]) -> ContentChecksum {
    ContentChecksum::Md5(Md5::digest(data).to_vec())
}

// ═══════════════════════════ 决策表 ═══════════════════════════

#[tokio::test]
async fn absent_file_restarts_from_zero() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");

    let decision = ResumeVerifier::default()
        .decide(&dest, &metadata(1_000, None))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::RestartFromZero);
}

#[tokio::test]
async fn shorter_file_resumes_from_its_length() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![7u8; 500_000]).unwrap();

    let verifier = ResumeVerifier::default();
    let meta = metadata(1_000_000, None);
    let decision = verifier.decide(&dest, &meta).await.unwrap();
    assert_eq!(decision, ResumeDecision::ResumeFrom { start: 500_000 });

    let segments = plan_ranges(1_000_000, 500_000, 1_048_576).unwrap();
    assert_eq!(segments[0].start, 500_000);
}

#[tokio::test]
async fn complete_file_with_matching_md5_is_already_complete() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    let data = random_bytes(50_000);
    std::fs::write(&dest, &data).unwrap();

    let decision = ResumeVerifier::default()
        .decide(&dest, &metadata(50_000, Some(md5_of(&data))))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::AlreadyComplete);
}

#[tokio::test]
async fn complete_file_with_matching_sha256_is_already_complete() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    let data = random_bytes(10_000);
    std::fs::write(&dest, &data).unwrap();

    let checksum = ContentChecksum::Sha256(Sha256::digest(&data).to_vec());
    let decision = ResumeVerifier::new(64)
        .decide(&dest, &metadata(10_000, Some(checksum)))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::AlreadyComplete);
}

#[tokio::test]
async fn mismatched_or_missing_checksum_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    let data = random_bytes(4_096);
    std::fs::write(&dest, &data).unwrap();

    let verifier = ResumeVerifier::default();
    let other = md5_of(b"something else");
    assert_eq!(
        verifier.decide(&dest, &metadata(4_096, Some(other))).await.unwrap(),
        ResumeDecision::RestartFromZero
    );
    assert_eq!(
        verifier.decide(&dest, &metadata(4_096, None)).await.unwrap(),
        ResumeDecision::RestartFromZero
    );
}

#[tokio::test]
async fn longer_file_is_checked_not_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![1u8; 2_000]).unwrap();

    let decision = ResumeVerifier::default()
        .decide(&dest, &metadata(1_000, None))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::RestartFromZero);
}

#[tokio::test]
async fn decision_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let verifier = ResumeVerifier::default();

    let partial = dir.path().join("partial.bin");
    std::fs::write(&partial, vec![0u8; 300]).unwrap();
    let meta = metadata(1_000, None);
    let first = verifier.decide(&partial, &meta).await.unwrap();
    let second = verifier.decide(&partial, &meta).await.unwrap();
    assert_eq!(first, second);

    let full = dir.path().join("full.bin");
    let data = random_bytes(1_000);
    std::fs::write(&full, &data).unwrap();
    let meta = metadata(1_000, Some(md5_of(&data)));
    let first = verifier.decide(&full, &meta).await.unwrap();
    let second = verifier.decide(&full, &meta).await.unwrap();
    assert_eq!(first, ResumeDecision::AlreadyComplete);
    assert_eq!(first, second);
    assert_eq!(std::fs::read(&full).unwrap(), data, "判断不应修改文件");
}

// ═══════════════════════════ 分片记录 ═══════════════════════════

#[tokio::test]
async fn record_prefix_overrides_preallocated_length() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    // 预分配后的文件看起来是完整长度
    std::fs::write(&dest, vec![0u8; 10_000]).unwrap();

    let mut record = SegmentRecord::new(10_000);
    record.mark_completed(0, 2_999);
    record.mark_completed(6_000, 7_999);
    record.save(&dest).await.unwrap();

    let verifier = ResumeVerifier::default();
    let decision = verifier.decide(&dest, &metadata(10_000, None)).await.unwrap();
    assert_eq!(decision, ResumeDecision::ResumeFrom { start: 3_000 });

    // 关闭记录后回到按文件长度判断
    let decision = verifier
        .with_segment_record(false)
        .decide(&dest, &metadata(10_000, None))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::RestartFromZero);
}

#[tokio::test]
async fn record_for_different_size_forces_restart() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![0u8; 100]).unwrap();
    SegmentRecord::with_prefix(5_000, 100).save(&dest).await.unwrap();

    let decision = ResumeVerifier::default()
        .decide(&dest, &metadata(6_000, None))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::RestartFromZero);
}

// ═══════════════════════════ 文件准备 ═══════════════════════════

#[tokio::test]
async fn restart_truncates_and_preallocates() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![9u8; 50]).unwrap();

    let verifier = ResumeVerifier::default();
    let start = verifier
        .prepare(&dest, 1_000, ResumeDecision::RestartFromZero)
        .await
        .unwrap();
    assert_eq!(start, 0);

    let content = std::fs::read(&dest).unwrap();
    assert_eq!(content.len(), 1_000);
    assert!(content.iter().all(|&b| b == 0), "重下时应截断旧内容");

    let record = SegmentRecord::load(&dest).await.unwrap().unwrap();
    assert_eq!(record, SegmentRecord::new(1_000));
}

#[tokio::test]
async fn resume_keeps_prefix_and_extends() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![5u8; 400]).unwrap();

    let start = ResumeVerifier::default()
        .prepare(&dest, 1_000, ResumeDecision::ResumeFrom { start: 400 })
        .await
        .unwrap();
    assert_eq!(start, 400);

    let content = std::fs::read(&dest).unwrap();
    assert_eq!(content.len(), 1_000);
    assert!(content[..400].iter().all(|&b| b == 5));

    let record = SegmentRecord::load(&dest).await.unwrap().unwrap();
    assert_eq!(record.contiguous_prefix(), 400);
}

#[tokio::test]
async fn prepare_without_record_leaves_no_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");

    ResumeVerifier::default()
        .with_segment_record(false)
        .prepare(&dest, 10, ResumeDecision::RestartFromZero)
        .await
        .unwrap();
    assert!(!SegmentRecord::path_for(&dest).exists());
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 10);
}

#[tokio::test]
async fn checksum_uses_small_buffers_correctly() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    let data = random_bytes(10_001);
    std::fs::write(&dest, &data).unwrap();

    let expected = md5_of(&data);
    let local = compute_file_checksum(&dest, &expected, 7).await.unwrap();
    assert_eq!(local, expected);
}

#[tokio::test]
async fn corrupt_record_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.bin");
    std::fs::write(&dest, vec![0u8; 100]).unwrap();
    std::fs::write(SegmentRecord::path_for(&dest), b"[1,2").unwrap();

    let decision = ResumeVerifier::default()
        .decide(&dest, &metadata(1_000, None))
        .await
        .unwrap();
    assert_eq!(decision, ResumeDecision::RestartFromZero);
}
