// Output naming unit tests

use chrono::{TimeZone, Utc};
use codestamp::batch::naming::{archive_file_name, sanitize_base_name, stamped_file_name, unique_names};
use rstest::rstest;

#[rstest]
#[case("My Photo!! (1).png", "My Photo 1_stamped.jpg")]
#[case("holiday.jpeg", "holiday_stamped.jpg")]
#[case("IMG_2041.HEIC.jpg", "IMG_2041HEIC_stamped.jpg")]
#[case("a-b c_d.webp", "a-b c_d_stamped.jpg")]
#[case("???.png", "image_stamped.jpg")]
#[case("ümlaut.png", "mlaut_stamped.jpg")]
#[case("README", "image_stamped.jpg")]
fn test_stamped_file_name(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(stamped_file_name(input), expected);
}

#[test]
fn test_sanitize_keeps_whitespace_and_hyphen() {
    assert_eq!(sanitize_base_name("  spaced - out .png"), "  spaced - out ");
}

#[test]
fn test_archive_name_has_no_colons_or_dots_before_extension() {
    let now = Utc.with_ymd_and_hms(2025, 1, 9, 8, 7, 6).unwrap();
    let name = archive_file_name(now);

    assert!(name.starts_with("textstamped_images_"));
    assert!(name.ends_with(".zip"));
    let stem = name.trim_end_matches(".zip");
    assert!(!stem.contains(':'));
    assert!(!stem.contains('.'));
    assert_eq!(name, "textstamped_images_2025-01-09T08-07-06-000Z.zip");
}

#[test]
fn test_unique_names_preserves_distinct_names() {
    let names = unique_names(["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
}
