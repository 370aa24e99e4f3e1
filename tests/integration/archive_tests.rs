//! Integration tests for archive packaging.
//!
//! Tests run the pipeline directly and inspect the produced ZIP archive.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use mapslicer::publish::{AssetPublisher, LocalAssetStore};
use mapslicer::workflow::SlicePipeline;

use super::test_utils::{test_png, TEST_MAX_UPLOAD_BYTES};

fn test_pipeline(root: &std::path::Path) -> SlicePipeline {
    let publisher = AssetPublisher::new(
        LocalAssetStore::new(root.join("static/slices"), "/static/slices"),
        None,
    );
    SlicePipeline::new(
        publisher,
        root.join("work"),
        root.join("output"),
        TEST_MAX_UPLOAD_BYTES,
    )
}

#[tokio::test]
async fn test_archive_bundles_markup_and_slices() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = test_pipeline(dir.path());

    let map = r#"
        <area shape="rect" coords="0,0,300,150" href="https://example.com/a" alt="Top">
        <area shape="rect" coords="0,150,300,300" href="https://example.com/b" alt="Bottom">
    "#;
    let output = pipeline
        .run("banner.png", test_png(300, 300).into(), map)
        .await
        .unwrap();

    let data = std::fs::read(&output.archive_path).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"email_template.html".to_string()));
    assert!(names.contains(&"slice_0.png".to_string()));
    assert!(names.contains(&"slice_1.png".to_string()));
    assert_eq!(names.len(), 3);

    // Bundled markup matches what the pipeline returned
    let mut markup = String::new();
    archive
        .by_name("email_template.html")
        .unwrap()
        .read_to_string(&mut markup)
        .unwrap();
    assert_eq!(markup, output.html);

    // Bundled slices decode with the region dimensions
    let mut slice_data = Vec::new();
    archive
        .by_name("slice_0.png")
        .unwrap()
        .read_to_end(&mut slice_data)
        .unwrap();
    let img = image::load_from_memory(&slice_data).unwrap();
    assert_eq!((img.width(), img.height()), (300, 150));
}

#[tokio::test]
async fn test_archive_name_carries_session_id() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = test_pipeline(dir.path());

    let map = r#"<area shape="rect" coords="0,0,50,50" href="https://a.test">"#;
    let output = pipeline
        .run("banner.png", test_png(50, 50).into(), map)
        .await
        .unwrap();

    assert_eq!(
        output.archive_file,
        format!("email_template_{}.zip", output.session_id)
    );
    assert!(output.archive_path.ends_with(&output.archive_file));
}

#[tokio::test]
async fn test_session_workspace_removed_after_run() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = test_pipeline(dir.path());

    let map = r#"<area shape="rect" coords="0,0,50,50" href="https://a.test">"#;
    let output = pipeline
        .run("banner.png", test_png(50, 50).into(), map)
        .await
        .unwrap();

    // Intermediates are gone, durable outputs remain
    assert!(!dir.path().join("work").join(&output.session_id).exists());
    assert!(output.archive_path.exists());
    for asset in &output.assets {
        assert!(asset.local_path.exists());
    }
}
