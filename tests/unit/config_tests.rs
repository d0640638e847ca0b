// Configuration unit tests

use codestamp::config::AppConfig;
use codestamp::stamp::{Anchor, NormalizedPoint, Placement, StampConfig};
use rstest::rstest;
use std::io::Write;

#[test]
fn test_config_file_round_trip_through_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
stamp:
  data: "INV-0042"
  placement: bottom-right
  font_size: 18
output:
  dir: "./exports"
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).expect("Valid YAML should parse");
    assert_eq!(config.stamp.data, "INV-0042");
    assert_eq!(
        config.stamp.placement,
        Some(Placement::Anchor(Anchor::BottomRight))
    );
    assert_eq!(config.stamp.font_size, 18);
    assert_eq!(config.stamp.padding, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_config_file() {
    let err = AppConfig::from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}

#[test]
fn test_invalid_yaml_is_error() {
    assert!(AppConfig::from_yaml_with_env("stamp: [unclosed").is_err());
}

#[test]
fn test_unknown_anchor_is_error() {
    assert!(AppConfig::from_yaml_with_env("stamp:\n  placement: middle\n").is_err());
}

#[rstest]
#[case("5", 10)]
#[case("10", 10)]
#[case("24", 24)]
#[case("100", 100)]
#[case("101", 100)]
#[case("", 10)]
#[case("big", 10)]
fn test_font_size_input(#[case] raw: &str, #[case] expected: u32) {
    let mut config = StampConfig::default();
    assert_eq!(config.set_font_size_input(raw), expected);
    assert_eq!(config.font_size, expected);
}

#[rstest]
#[case("-1", 0)]
#[case("0", 0)]
#[case("25", 25)]
#[case("50", 50)]
#[case("51", 50)]
#[case("x", 0)]
fn test_padding_input(#[case] raw: &str, #[case] expected: u32) {
    let mut config = StampConfig::default();
    assert_eq!(config.set_padding_input(raw), expected);
}

#[test]
fn test_placement_modes_are_exclusive() {
    let config = StampConfig::new("A").with_anchor(Anchor::TopLeft).with_point(0.3, 0.4);
    assert_eq!(
        config.placement,
        Some(Placement::Point(NormalizedPoint::new(0.3, 0.4)))
    );

    let config = config.with_anchor(Anchor::Center);
    assert_eq!(config.placement, Some(Placement::Anchor(Anchor::Center)));
}
