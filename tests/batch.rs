mod common;

use std::fs;
use image_pipeline_lib::{BatchProcessor, PipelineConfig, PipelineError, optimize_images};
use tokio::sync::watch;

use common::{file_names, photo, storage, write_jpeg, write_png};

#[tokio::test]
async fn one_corrupt_file_does_not_abort_the_batch() {
    let (_root, config) = storage();
    write_jpeg(&config.source_path("a1.jpg"), &photo(80, 60, 1));
    write_png(&config.source_path("a2.png"), &photo(50, 50, 2));
    write_jpeg(&config.source_path("a10.JPEG"), &photo(70, 90, 3));
    fs::write(config.source_path("a3.png"), b"not a png at all").unwrap();
    fs::write(config.source_path("notes.txt"), b"ignored by the batch").unwrap();

    let summary = optimize_images(&config, None).await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "a3.png");
    assert!(!summary.cancelled);
    assert_eq!(file_names(&config.processed_dir), vec!["a1.jpg", "a10.JPEG", "a2.png"]);

    let expected_original: u64 = ["a1.jpg", "a2.png", "a10.JPEG"]
        .iter()
        .map(|n| fs::metadata(config.source_path(n)).unwrap().len())
        .sum();
    assert_eq!(summary.total_original_bytes, expected_original);
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_and_dot_named_sources_are_processed() {
    let (root, config) = storage();
    let elsewhere = root.path().join("library");
    fs::create_dir_all(&elsewhere).unwrap();
    write_jpeg(&elsewhere.join("shot.jpg"), &photo(48, 48, 11));
    std::os::unix::fs::symlink(elsewhere.join("shot.jpg"), config.source_path("linked.jpg")).unwrap();
    write_png(&config.source_path(".dot.png"), &photo(40, 40, 12));

    let summary = optimize_images(&config, None).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert!(summary.failed.is_empty());
    assert_eq!(file_names(&config.processed_dir), vec![".dot.png", "linked.jpg"]);
    let originals = image_pipeline_lib::list_original_images(&config).await.unwrap();
    assert_eq!(originals.len(), 2);
}

#[tokio::test]
async fn abandoned_temporaries_are_swept_at_batch_start() {
    let (_root, config) = storage();
    write_jpeg(&config.source_path("keep.jpg"), &photo(32, 32, 13));
    fs::create_dir_all(&config.processed_dir).unwrap();
    let leftover = config.processed_path(".keep.jpg.999-3.tmp");
    fs::write(&leftover, b"half written").unwrap();
    fs::File::options()
        .write(true)
        .open(&leftover)
        .unwrap()
        .set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(600))
        .unwrap();

    optimize_images(&config, None).await.unwrap();

    assert_eq!(file_names(&config.processed_dir), vec!["keep.jpg"]);
}

#[tokio::test]
async fn rerun_skips_everything_with_same_totals() {
    let (_root, config) = storage();
    write_jpeg(&config.source_path("x.jpg"), &photo(64, 48, 4));
    write_png(&config.source_path("y.png"), &photo(48, 64, 5));

    let first = optimize_images(&config, None).await.unwrap();
    let second = optimize_images(&config, None).await.unwrap();

    assert_eq!(first.processed, 2);
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.total_original_bytes, first.total_original_bytes);
    assert_eq!(second.total_processed_bytes, first.total_processed_bytes);
    assert_eq!(second.reduction_percent(), first.reduction_percent());
}

#[tokio::test]
async fn output_directory_is_created() {
    let (_root, config) = storage();
    write_jpeg(&config.source_path("only.jpg"), &photo(32, 32, 6));
    assert!(!config.processed_dir.exists());

    BatchProcessor::new(config.clone()).unwrap().preprocess_all().await.unwrap();

    assert!(config.processed_path("only.jpg").exists());
}

#[tokio::test]
async fn missing_source_directory_is_batch_fatal() {
    let root = tempfile::tempdir().unwrap();
    let config = PipelineConfig::with_root(root.path());

    let err = optimize_images(&config, None).await.unwrap_err();

    assert!(matches!(err, PipelineError::Directory(_)));
}

#[tokio::test]
async fn empty_source_directory_reports_nothing() {
    let (_root, config) = storage();

    let summary = optimize_images(&config, None).await.unwrap();

    assert_eq!(summary.processed + summary.skipped + summary.failed.len(), 0);
    assert_eq!(summary.reduction_percent(), 0.0);
}

#[tokio::test]
async fn shutdown_before_start_leaves_no_partial_outputs() {
    let (_root, config) = storage();
    for i in 0..4 {
        write_jpeg(&config.source_path(&format!("img{i}.jpg")), &photo(64, 64, i));
    }
    let (_tx, rx) = watch::channel(true);

    let summary = BatchProcessor::new(config.clone())
        .unwrap()
        .preprocess_all_until(rx)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.processed, 0);
    // neither finished outputs nor leftover temp files
    assert!(file_names(&config.processed_dir).is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_up_front() {
    let (_root, mut config) = storage();
    config.jpeg_quality = 101;

    assert!(matches!(BatchProcessor::new(config), Err(PipelineError::Config(_))));
}
