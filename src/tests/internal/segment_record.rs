use crate::downloader::SegmentRecord;

#[test]
fn adjacent_and_overlapping_ranges_merge() {
    let mut r = SegmentRecord::new(100);
    r.mark_completed(20, 29);
    r.mark_completed(0, 9);
    r.mark_completed(10, 19);
    r.mark_completed(50, 59);
    r.mark_completed(55, 69);
    assert_eq!(r.completed, vec![(0, 29), (50, 69)]);
    assert_eq!(r.contiguous_prefix(), 30);
}

#[test]
fn prefix_is_zero_without_first_segment() {
    let mut r = SegmentRecord::new(100);
    r.mark_completed(10, 99);
    assert_eq!(r.contiguous_prefix(), 0);

    r.mark_completed(0, 9);
    assert_eq!(r.contiguous_prefix(), 100);
}

#[test]
fn with_prefix_zero_is_empty() {
    assert!(SegmentRecord::with_prefix(10, 0).completed.is_empty());
    assert_eq!(SegmentRecord::with_prefix(10, 4).completed, vec![(0, 3)]);
}

#[test]
fn sidecar_sits_next_to_file() {
    let p = SegmentRecord::path_for(std::path::Path::new("/tmp/dl/movie.mkv"));
    assert_eq!(p, std::path::PathBuf::from("/tmp/dl/movie.mkv.segments.json"));
}

#[tokio::test]
async fn save_load_remove() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");

    assert_eq!(SegmentRecord::load(&dest).await.unwrap(), None);

    let mut r = SegmentRecord::new(1_000);
    r.mark_completed(0, 499);
    r.save(&dest).await.unwrap();
    assert_eq!(SegmentRecord::load(&dest).await.unwrap(), Some(r));

    SegmentRecord::remove(&dest).await.unwrap();
    assert!(!SegmentRecord::path_for(&dest).exists());
    // 再删一次也不报错
    SegmentRecord::remove(&dest).await.unwrap();
}

#[tokio::test]
async fn corrupt_record_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    std::fs::write(SegmentRecord::path_for(&dest), b"{not json").unwrap();

    assert!(matches!(
        SegmentRecord::load(&dest).await,
        Err(crate::downloader::DownloadError::SegmentRecordFormat(_))
    ));
}
