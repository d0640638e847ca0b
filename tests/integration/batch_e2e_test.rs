// Batch processing end-to-end tests
//
// Drives a full session: selection, configuration, processing and the
// archive written to the output directory.

use super::test_harness::{archives_in, selected_png, session_in, zip_entries};
use codestamp::batch::SelectedImage;
use codestamp::session::{ArchiveStatus, ProcessOutcome, NOT_READY_PROMPT};
use codestamp::stamp::{Anchor, Placement};
use image::GenericImageView;

#[tokio::test]
async fn test_three_images_are_stamped_and_zipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.select_images(vec![
        selected_png("front.png", 320, 240),
        selected_png("back side.png", 200, 300),
        selected_png("label(1).png", 640, 480),
    ]);
    assert_eq!(session.selection_message(), "Selected 3 image(s)");

    let config = session.config_mut();
    config.set_data("ABC123");
    config.set_font_size_input("24");
    config.set_padding_input("10");
    config.set_custom_position(0.5, 0.5);

    let mut updates = Vec::new();
    let outcome = session
        .process(|progress| updates.push(progress.message()))
        .await
        .unwrap();

    let ProcessOutcome::Completed { summary, archive } = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.status, "Completed processing 3 images!");
    assert_eq!(updates.last().unwrap(), "Completed processing 3 images!");

    let Some(ArchiveStatus::Saved { path, count }) = archive else {
        panic!("expected the archive to be saved");
    };
    assert_eq!(count, 3);
    assert_eq!(archives_in(dir.path()), vec![path.clone()]);

    let entries = zip_entries(&path);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["back side_stamped.jpg", "front_stamped.jpg", "label1_stamped.jpg"]
    );

    // Output keeps the source dimensions.
    for (name, data) in &entries {
        let decoded = image::load_from_memory(data).unwrap();
        let expected = match name.as_str() {
            "front_stamped.jpg" => (320, 240),
            "back side_stamped.jpg" => (200, 300),
            _ => (640, 480),
        };
        assert_eq!(decoded.dimensions(), expected, "{}", name);
    }
}

#[tokio::test]
async fn test_barcode_without_data_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.select_images(vec![selected_png("a.png", 100, 100)]);
    let config = session.config_mut();
    config.barcode_enabled = true;
    config.set_data("   ");
    config.set_custom_position(0.5, 0.5);

    let mut calls = 0;
    let outcome = session.process(|_| calls += 1).await.unwrap();

    assert_eq!(
        outcome,
        ProcessOutcome::NotReady {
            prompt: NOT_READY_PROMPT
        }
    );
    assert_eq!(calls, 0);
    assert!(session.processed().is_empty());
    assert!(archives_in(dir.path()).is_empty());
}

#[tokio::test]
async fn test_corrupt_image_is_counted_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.select_images(vec![
        selected_png("one.png", 120, 80),
        SelectedImage::new("broken.png", b"definitely not an image".to_vec()),
        selected_png("three.png", 80, 120),
    ]);
    let config = session.config_mut();
    config.set_data("ABC123");
    config.barcode_enabled = true;
    config.barcode_width_percent = 40;
    config.placement = Some(Placement::Anchor(Anchor::BottomRight));

    let mut failed = Vec::new();
    let outcome = session
        .process(|progress| {
            if let Some(name) = &progress.failed_name {
                failed.push(name.clone());
            }
        })
        .await
        .unwrap();

    let ProcessOutcome::Completed { summary, archive } = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.status, "Completed. Processed: 2/3. Errors: 1.");
    assert_eq!(failed, vec!["broken.png".to_string()]);

    let Some(ArchiveStatus::Saved { path, .. }) = archive else {
        panic!("expected the archive to be saved");
    };
    let names: Vec<String> = zip_entries(&path).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["one_stamped.jpg", "three_stamped.jpg"]);
}

#[tokio::test]
async fn test_all_failures_write_no_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.select_images(vec![SelectedImage::new("bad.png", vec![0u8; 16])]);
    let config = session.config_mut();
    config.set_data("X");
    config.set_custom_position(0.1, 0.1);

    let outcome = session.process(|_| {}).await.unwrap();
    let ProcessOutcome::Completed { summary, archive } = outcome else {
        panic!("expected a completed run");
    };

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.errors, 1);
    assert!(archive.is_none());
    assert!(archives_in(dir.path()).is_empty());
    assert_eq!(
        session.download_all_processed().await,
        ArchiveStatus::NothingToDownload
    );
}

#[tokio::test]
async fn test_download_all_off_saves_nothing_until_asked() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.set_download_all(false);
    session.select_images(vec![
        selected_png("dup.png", 60, 60),
        selected_png("dup.png", 60, 60),
    ]);
    let config = session.config_mut();
    config.set_data("Z");
    config.set_custom_position(0.5, 0.5);

    let outcome = session.process(|_| {}).await.unwrap();
    assert!(matches!(
        outcome,
        ProcessOutcome::Completed { archive: None, .. }
    ));
    assert!(archives_in(dir.path()).is_empty());

    let paths = session.save_processed(None).await.unwrap();
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["dup_stamped.jpg", "dup_stamped_2.jpg"]);
}
