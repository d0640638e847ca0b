//! Output file naming.
//!
//! Stamped images are saved as `<base>_stamped.jpg`, where `<base>` is the
//! original file name without its extension and with anything outside
//! letters, digits, underscore, whitespace and hyphen removed.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Suffix appended to every stamped output.
pub const STAMPED_SUFFIX: &str = "_stamped.jpg";

/// Base name used when nothing survives sanitizing.
pub const FALLBACK_BASE_NAME: &str = "image";

/// Prefix of archive file names.
pub const ARCHIVE_PREFIX: &str = "textstamped_images_";

static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

/// Characters removed from base names.
///
/// The pattern is a constant and is exercised by every naming test.
fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_\s-]").expect("Invalid file name regex - this is a compile-time bug")
    })
}

/// Strip the extension and unsafe characters from an input file name.
///
/// Everything from the last dot on is the extension. A name with no dot
/// has an empty stem and falls back to `image`.
pub fn sanitize_base_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => "",
    };

    let cleaned = unsafe_chars().replace_all(stem, "");
    if cleaned.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Download name for a stamped image.
pub fn stamped_file_name(file_name: &str) -> String {
    format!("{}{}", sanitize_base_name(file_name), STAMPED_SUFFIX)
}

/// Timestamped archive name, e.g. `textstamped_images_2024-05-01T10-20-30-123Z.zip`.
pub fn archive_file_name(now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}{}.zip", ARCHIVE_PREFIX, timestamp)
}

/// Make names unique by inserting `_2`, `_3`, ... before the extension.
///
/// The first occurrence of a name is kept unchanged; order is preserved.
pub fn unique_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        if taken.insert(name.to_string()) {
            result.push(name.to_string());
            continue;
        }

        let (stem, ext) = match name.rfind('.') {
            Some(idx) => name.split_at(idx),
            None => (name, ""),
        };

        let mut counter = 2;
        let unique = loop {
            let candidate = format!("{}_{}{}", stem, counter, ext);
            if taken.insert(candidate.clone()) {
                break candidate;
            }
            counter += 1;
        };
        result.push(unique);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_regex_is_valid() {
        assert!(unsafe_chars().is_match("!"));
        assert!(!unsafe_chars().is_match("a"));
    }

    #[test]
    fn test_sanitize_strips_extension_and_specials() {
        assert_eq!(sanitize_base_name("My Photo!! (1).png"), "My Photo 1");
        assert_eq!(stamped_file_name("My Photo!! (1).png"), "My Photo 1_stamped.jpg");
    }

    #[test]
    fn test_sanitize_only_last_extension() {
        assert_eq!(sanitize_base_name("archive.tar.gz"), "archivetar");
        assert_eq!(sanitize_base_name("scan_01-final.JPEG"), "scan_01-final");
    }

    #[test]
    fn test_sanitize_falls_back_to_image() {
        assert_eq!(sanitize_base_name("!!!.jpg"), "image");
        assert_eq!(sanitize_base_name(".png"), "image");
        assert_eq!(stamped_file_name("(*).gif"), "image_stamped.jpg");
    }

    #[test]
    fn test_sanitize_without_dot_falls_back_to_image() {
        assert_eq!(sanitize_base_name("README"), "image");
        assert_eq!(stamped_file_name("scan_0001"), "image_stamped.jpg");
    }

    #[test]
    fn test_archive_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(
            archive_file_name(now),
            "textstamped_images_2024-05-01T10-20-30-123Z.zip"
        );
    }

    #[test]
    fn test_unique_names() {
        let names = unique_names([
            "a_stamped.jpg",
            "b_stamped.jpg",
            "a_stamped.jpg",
            "a_stamped.jpg",
        ]);
        assert_eq!(
            names,
            vec![
                "a_stamped.jpg",
                "b_stamped.jpg",
                "a_stamped_2.jpg",
                "a_stamped_3.jpg"
            ]
        );
    }

    #[test]
    fn test_unique_names_skips_existing_suffix() {
        let names = unique_names(["x_2.jpg", "x.jpg", "x.jpg"]);
        assert_eq!(names, vec!["x_2.jpg", "x.jpg", "x_3.jpg"]);
    }
}
