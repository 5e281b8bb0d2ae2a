//! Path segment splitting and Unicode-aware segment comparison
//!
//! Listings and progress notifications may spell the same file name in different
//! Unicode normalization forms (macOS file systems report decomposed names, most
//! archives store precomposed ones), so segment comparison goes through NFC.

use std::borrow::Cow;
use std::path::Path;
use unicode_normalization::{UnicodeNormalization, is_nfc_quick};

/// Split a path into its non-empty segments, accepting both `/` and `\` as separators
///
/// # Examples
///
/// ```
/// use unzip_progress::utils::segments;
///
/// assert_eq!(segments(r"out\docs/readme.txt"), vec!["out", "docs", "readme.txt"]);
/// assert_eq!(segments("/a//b/"), vec!["a", "b"]);
/// ```
pub fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// Split a [`Path`] into segments, lossily converting non-UTF-8 components
pub fn path_segments(path: &Path) -> Vec<String> {
    segments(&path.to_string_lossy())
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Canonical composed (NFC) form of a segment, borrowing when it is already composed
pub fn normalize(segment: &str) -> Cow<'_, str> {
    match is_nfc_quick(segment.chars()) {
        unicode_normalization::IsNormalized::Yes => Cow::Borrowed(segment),
        _ => Cow::Owned(segment.nfc().collect()),
    }
}

/// Compare two path segments under Unicode canonical equivalence
///
/// # Examples
///
/// ```
/// use unzip_progress::utils::segment_eq;
///
/// assert!(segment_eq("caf\u{e9}", "cafe\u{301}"));
/// assert!(!segment_eq("cafe", "caf\u{e9}"));
/// ```
pub fn segment_eq(a: &str, b: &str) -> bool {
    a == b || normalize(a) == normalize(b)
}
