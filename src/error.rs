//! Error types for unzip-progress
//!
//! Reconciling progress never fails: unmatched paths and events for archives that
//! are no longer tracked are logged and dropped. Errors only surface from
//! configuration, from the external lister, and from the external extractor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unzip-progress operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unzip-progress
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "event_channel_capacity")
        key: Option<String>,
    },

    /// The external lister could not produce a tree for an archive
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),

    /// No record is tracked under this path
    #[error("archive not tracked: {}", .0.display())]
    NotTracked(PathBuf),

    /// The external extractor reported a failure for an archive
    #[error("extraction failed for {}: {reason}", .archive.display())]
    ExtractorFailed {
        /// Archive the extractor was working on
        archive: PathBuf,
        /// Reason reported by the extractor
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported while listing an archive's contents
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ListingError {
    /// The path is not an archive the lister understands (or not a file at all)
    #[error("unsupported file: {}", .0.display())]
    UnsupportedFile(PathBuf),

    /// The archive is encrypted and no working password was supplied
    #[error("password required: {}", .0.display())]
    NeedPassword(PathBuf),

    /// Entry names decoded into mojibake; another codepage should be tried
    #[error("invalid UTF-8 entry name: {0}")]
    InvalidUtf8(String),

    /// The listing command itself failed
    #[error("list command failed: {0}")]
    CommandError(String),

    /// A listing line could not be parsed
    #[error("malformed listing line {line:?}: {reason}")]
    Malformed {
        /// Offending line
        line: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ListingError {
    /// Whether the archive type is unsupported, as opposed to a generic listing failure
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ListingError::UnsupportedFile(_))
    }
}

/// Why a record left the registry, surfaced to the UI with [`crate::Event::Removed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RemovalReason {
    /// The user removed the archive
    UserRemoved,
    /// The lister does not support this file
    Unsupported,
    /// Listing failed for another reason
    ListingFailed(String),
    /// The path turned out to be one volume of a set already tracked elsewhere
    MergedIntoVolumeSet(PathBuf),
}

impl From<&ListingError> for RemovalReason {
    fn from(err: &ListingError) -> Self {
        if err.is_unsupported() {
            RemovalReason::Unsupported
        } else {
            RemovalReason::ListingFailed(err.to_string())
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_listing_maps_to_unsupported_reason() {
        let err = ListingError::UnsupportedFile(PathBuf::from("/tmp/notes.txt"));
        assert!(err.is_unsupported());
        assert_eq!(RemovalReason::from(&err), RemovalReason::Unsupported);
    }

    #[test]
    fn other_listing_failures_carry_their_message() {
        let err = ListingError::NeedPassword(PathBuf::from("/tmp/secret.7z"));
        assert!(!err.is_unsupported());
        match RemovalReason::from(&err) {
            RemovalReason::ListingFailed(msg) => {
                assert!(msg.contains("secret.7z"), "got: {msg}");
            }
            other => panic!("expected ListingFailed, got {other:?}"),
        }
    }

    #[test]
    fn listing_error_converts_into_main_error() {
        let err: Error = ListingError::CommandError("exit code 2".into()).into();
        assert_eq!(err.to_string(), "listing error: list command failed: exit code 2");
    }

    #[test]
    fn removal_reason_serializes_tagged() {
        let json = serde_json::to_value(RemovalReason::UserRemoved).unwrap();
        assert_eq!(json["reason"], "user_removed");
    }
}
