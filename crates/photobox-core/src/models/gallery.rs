//! Gallery view models.
//!
//! Nothing here is persisted: entries are rebuilt from filesystem metadata on
//! every listing request.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One stored original as shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GalleryEntry {
    pub name: String,
    pub mod_time: DateTime<Utc>,
    /// URL path of the derived thumbnail, e.g. `/thumbnails/beach.jpg`
    pub thumbnail: String,
}

/// A window of gallery entries, most recently modified first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub files: Vec<GalleryEntry>,
}

/// Bare-name listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamesPage {
    pub files: Vec<String>,
}

/// 1-based page number taken from an untrusted query string.
///
/// Parsing is forgiving: an absent page means page 1, and anything that does
/// not parse as an integer becomes 0. Page numbers below 1 resolve to the
/// first page rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        let number = match raw {
            None => 1,
            Some(value) => value.parse::<i64>().unwrap_or(0),
        };
        Self { number }
    }

    /// Index range of this page within `len` sorted entries.
    pub fn window(&self, len: usize, page_size: usize) -> Range<usize> {
        let page_size_i64 = i64::try_from(page_size).unwrap_or(i64::MAX);
        let start = self
            .number
            .saturating_sub(1)
            .saturating_mul(page_size_i64)
            .max(0);
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(page_size).min(len);
        start..end
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { number: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(PageRequest::parse(None).number, 1);
        assert_eq!(PageRequest::parse(Some("")).number, 0);
        assert_eq!(PageRequest::parse(Some("abc")).number, 0);
        assert_eq!(PageRequest::parse(Some("3")).number, 3);
        assert_eq!(PageRequest::parse(Some("-2")).number, -2);
    }

    #[test]
    fn test_window_pages_of_nine() {
        let len = 25;
        assert_eq!(PageRequest { number: 1 }.window(len, 9), 0..9);
        assert_eq!(PageRequest { number: 2 }.window(len, 9), 9..18);
        assert_eq!(PageRequest { number: 3 }.window(len, 9), 18..25);
        assert!(PageRequest { number: 4 }.window(len, 9).is_empty());
    }

    #[test]
    fn test_window_non_positive_pages_show_first_page() {
        for number in [0, -1, i64::MIN] {
            assert_eq!(PageRequest { number }.window(25, 9), 0..9);
        }
    }

    #[test]
    fn test_window_huge_page_is_empty() {
        let window = PageRequest { number: i64::MAX }.window(25, 9);
        assert_eq!(window, 25..25);
    }

    #[test]
    fn test_window_empty_gallery() {
        assert_eq!(PageRequest::default().window(0, 9), 0..0);
    }

    #[test]
    fn test_entry_serializes_mod_time_as_rfc3339() {
        let entry = GalleryEntry {
            name: "a.jpg".to_string(),
            mod_time: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            thumbnail: "/thumbnails/a.jpg".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "a.jpg");
        assert_eq!(json["mod_time"], "2024-05-01T10:00:00Z");
        assert_eq!(json["thumbnail"], "/thumbnails/a.jpg");
    }
}
