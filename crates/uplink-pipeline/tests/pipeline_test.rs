//! End-to-end pipeline tests over real temp files.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use uplink_core::models::MediaAttribute;
use uplink_core::{ThumbnailMode, UplinkError, UploadConfig};
use uplink_pipeline::{check_exists, filter_existing, SizeRule, Traversal, UploadPipeline};

fn config_with_max(max_object_size: u64) -> UploadConfig {
    UploadConfig {
        max_object_size,
        ..UploadConfig::default()
    }
}

async fn collect_units(
    pipeline: &mut UploadPipeline,
) -> Vec<(String, u64, String, Vec<u8>)> {
    let mut out = Vec::new();
    while let Some(mut unit) = pipeline.next_unit().await.unwrap() {
        let name = unit.name().to_string();
        let size = unit.size();
        let caption = unit.caption().to_string();
        let mut bytes = Vec::new();
        unit.read_to_end(&mut bytes).await.unwrap();
        out.push((name, size, caption, bytes));
    }
    out
}

#[tokio::test]
async fn oversized_file_splits_and_reconstructs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    let data: Vec<u8> = (0..250u32).map(|i| (i * 7) as u8).collect();
    tokio::fs::write(&path, &data).await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![path],
        config_with_max(100),
        Traversal::FilesOnly,
        SizeRule::Split,
    );
    let units = collect_units(&mut pipeline).await;

    let names: Vec<&str> = units.iter().map(|(n, ..)| n.as_str()).collect();
    assert_eq!(names, ["blob.bin.0", "blob.bin.1", "blob.bin.2"]);
    let sizes: Vec<u64> = units.iter().map(|&(_, s, ..)| s).collect();
    assert_eq!(sizes, [100, 100, 50]);

    let rebuilt: Vec<u8> = units.into_iter().flat_map(|(.., bytes)| bytes).collect();
    assert_eq!(rebuilt, data);
}

#[tokio::test]
async fn size_equal_to_limit_never_splits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exact.bin");
    tokio::fs::write(&path, vec![1u8; 100]).await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![path],
        config_with_max(100),
        Traversal::FilesOnly,
        SizeRule::Split,
    );
    let units = collect_units(&mut pipeline).await;

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].0, "exact.bin");
    assert_eq!(units[0].1, 100);
}

#[tokio::test]
async fn reject_rule_fails_oversized_but_continues() {
    let dir = tempfile::tempdir().unwrap();
    let big = dir.path().join("big.bin");
    let small = dir.path().join("small.bin");
    tokio::fs::write(&big, vec![0u8; 300]).await.unwrap();
    tokio::fs::write(&small, vec![0u8; 10]).await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![big.clone(), small],
        config_with_max(100),
        Traversal::FilesOnly,
        SizeRule::Reject,
    );

    match pipeline.next_unit().await {
        Err(UplinkError::FileTooLarge { path, size, limit }) => {
            assert_eq!(path, big);
            assert_eq!(size, 300);
            assert_eq!(limit, 100);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }

    // The failure consumed only the oversized input.
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(unit.name(), "small.bin");
    assert!(pipeline.next_unit().await.unwrap().is_none());
}

#[tokio::test]
async fn recursive_traversal_yields_nested_files() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("x.txt"), b"x").await.unwrap();
    tokio::fs::create_dir(dir.path().join("b")).await.unwrap();
    tokio::fs::write(dir.path().join("b").join("y.txt"), b"y")
        .await
        .unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![dir.path().to_path_buf()],
        config_with_max(100),
        Traversal::Recursive,
        SizeRule::Reject,
    );
    let units = collect_units(&mut pipeline).await;

    let names: BTreeSet<String> = units.into_iter().map(|(n, ..)| n).collect();
    let expected: BTreeSet<String> = ["x.txt".to_string(), "y.txt".to_string()]
        .into_iter()
        .collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn files_only_traversal_rejects_directory_but_continues() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ok.txt");
    tokio::fs::write(&file, b"ok").await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![dir.path().to_path_buf(), file],
        config_with_max(100),
        Traversal::FilesOnly,
        SizeRule::Reject,
    );

    match pipeline.next_unit().await {
        Err(UplinkError::InvalidInput(msg)) => {
            assert!(msg.contains(&dir.path().display().to_string()));
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(unit.name(), "ok.txt");
}

#[tokio::test]
async fn default_caption_strips_final_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4.txt");
    tokio::fs::write(&path, b"not really a video").await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![path],
        config_with_max(1000),
        Traversal::FilesOnly,
        SizeRule::Reject,
    );
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(unit.caption(), "clip.mp4");
}

#[tokio::test]
async fn caption_template_renders_and_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    tokio::fs::write(&path, b"data").await.unwrap();

    let config = UploadConfig {
        max_object_size: 1000,
        caption_template: Some("uploaded {name} as {stem}".to_string()),
        max_caption_length: 17,
        ..UploadConfig::default()
    };
    let mut pipeline =
        UploadPipeline::new(vec![path], config, Traversal::FilesOnly, SizeRule::Reject);
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(unit.caption(), "uploaded report.t");
}

#[tokio::test]
async fn explicit_thumbnail_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    tokio::fs::write(&path, b"data").await.unwrap();

    let config = UploadConfig {
        max_object_size: 1000,
        thumbnail: ThumbnailMode::Explicit(dir.path().join("missing.jpg")),
        ..UploadConfig::default()
    };
    let mut pipeline =
        UploadPipeline::new(vec![path], config, Traversal::FilesOnly, SizeRule::Reject);

    match pipeline.next_unit().await {
        Err(UplinkError::InvalidInput(msg)) => assert!(msg.contains("missing.jpg")),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[tokio::test]
async fn explicit_thumbnail_passes_through_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    let thumb = dir.path().join("cover.jpg");
    tokio::fs::write(&path, b"data").await.unwrap();
    tokio::fs::write(&thumb, b"jpeg bytes").await.unwrap();

    let config = UploadConfig {
        max_object_size: 1000,
        thumbnail: ThumbnailMode::Explicit(thumb.clone()),
        ..UploadConfig::default()
    };
    let mut pipeline =
        UploadPipeline::new(vec![path], config, Traversal::FilesOnly, SizeRule::Reject);
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(unit.thumbnail(), Some(thumb.as_path()));
}

#[tokio::test]
async fn forced_document_carries_filename_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    tokio::fs::write(&path, b"data").await.unwrap();

    let config = UploadConfig {
        max_object_size: 1000,
        force_document: true,
        ..UploadConfig::default()
    };
    let mut pipeline =
        UploadPipeline::new(vec![path], config, Traversal::FilesOnly, SizeRule::Reject);
    let unit = pipeline.next_unit().await.unwrap().unwrap();
    assert_eq!(
        unit.attributes(),
        &[MediaAttribute::Filename {
            name: "doc.txt".to_string()
        }]
    );
    // Forced-plain units never derive a thumbnail.
    assert!(unit.thumbnail().is_none());
}

#[tokio::test]
async fn split_parts_caption_defaults_to_part_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    tokio::fs::write(&path, vec![0u8; 150]).await.unwrap();

    let mut pipeline = UploadPipeline::new(
        vec![path],
        config_with_max(100),
        Traversal::FilesOnly,
        SizeRule::Split,
    );
    let units = collect_units(&mut pipeline).await;
    assert_eq!(units[0].2, "blob.bin.0");
    assert_eq!(units[1].2, "blob.bin.1");
}

#[test]
fn check_exists_reports_problems_without_failing() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nope.txt");
    let (valid, message) = check_exists(&missing);
    assert!(!valid);
    assert!(message.unwrap().contains("does not exist"));

    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, b"").unwrap();
    let (valid, message) = check_exists(&empty);
    assert!(!valid);
    assert!(message.unwrap().contains("is empty"));

    let good = dir.path().join("good.txt");
    std::fs::write(&good, b"data").unwrap();
    let (valid, message) = check_exists(&good);
    assert!(valid);
    assert!(message.is_none());
}

#[test]
fn filter_existing_drops_invalid_paths() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    std::fs::write(&good, b"data").unwrap();

    let kept = filter_existing(vec![
        dir.path().join("missing.txt"),
        good.clone(),
        PathBuf::from("/definitely/not/here"),
    ]);
    assert_eq!(kept, vec![good]);
}
