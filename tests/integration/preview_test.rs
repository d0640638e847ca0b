// Preview end-to-end tests

use super::test_harness::{selected_png, session_in};
use codestamp::stamp::{ComposeOutcome, Placement};

#[test]
fn test_preview_click_places_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    assert!(session.preview().unwrap().is_none());

    session.select_images(vec![selected_png("wide.png", 1200, 400)]);
    session.config_mut().set_data("Preview");

    let preview = session.preview().unwrap().unwrap();
    assert_eq!((preview.width(), preview.height()), (600, 200));
    assert_eq!(preview.outcome, ComposeOutcome::Skipped);

    session.place_from_preview(&preview, 150.0, 50.0);
    match session.config().placement {
        Some(Placement::Point(point)) => {
            assert!((point.x - 0.25).abs() < 1e-6);
            assert!((point.y - 0.25).abs() < 1e-6);
        }
        other => panic!("unexpected placement {:?}", other),
    }

    let stamped = session.preview().unwrap().unwrap();
    assert!(matches!(stamped.outcome, ComposeOutcome::Stamped(_)));
    assert_ne!(stamped.image, preview.image);

    let png = stamped.to_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.width(), 600);
}

#[test]
fn test_reset_clears_selection_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());

    session.select_images(vec![selected_png("a.png", 50, 50)]);
    session.set_download_all(false);
    session.config_mut().set_data("A");
    session.config_mut().set_custom_position(0.2, 0.8);
    assert!(session.has_required_inputs());

    session.reset();

    assert!(session.selected().is_empty());
    assert!(session.download_all());
    assert!(session.config().placement.is_none());
    assert!(!session.has_required_inputs());
}
