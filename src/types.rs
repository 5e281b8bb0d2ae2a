//! Core types for unzip-progress

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::counter::FileCounter;
use crate::error::RemovalReason;

/// Stable identifier of a tracked archive, never reused within one registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveId(pub u64);

impl ArchiveId {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ArchiveId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a tracked archive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    /// Dropped, waiting for its listing
    #[default]
    Pending,
    /// Listing applied, tree and totals known
    Listed,
    /// The extractor reported that it started on this archive
    Running,
    /// Counters show every listed entry extracted
    Completed,
}

/// Status carried by one progress notification
///
/// The serialized shape matches what extractors emit: the bare strings
/// `"Running"` / `"Completed"` or `{"Ok": "<output path>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// One entry has been written to disk at this path
    Ok(PathBuf),
    /// Extraction of the archive started
    Running,
    /// The extractor finished the archive
    Completed,
}

/// One message of the extraction progress stream, addressed by archive path
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Path of the archive the notification belongs to
    pub archive: PathBuf,
    /// What happened
    pub status: ProgressStatus,
}

impl ProgressEvent {
    /// Extraction of `archive` started
    pub fn running(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            status: ProgressStatus::Running,
        }
    }

    /// Extraction of `archive` finished
    pub fn completed(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            status: ProgressStatus::Completed,
        }
    }

    /// An entry of `archive` was written to `output`
    pub fn entry(archive: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            status: ProgressStatus::Ok(output.into()),
        }
    }
}

impl From<(PathBuf, ProgressStatus)> for ProgressEvent {
    fn from((archive, status): (PathBuf, ProgressStatus)) -> Self {
        Self { archive, status }
    }
}

/// An archive whose extraction finished, as handed to follow-up actions (cleanup etc.)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletedArchive {
    /// A single-file archive
    Single(PathBuf),
    /// Every on-disk volume of a multi-volume archive
    Volumes(Vec<PathBuf>),
}

impl CompletedArchive {
    /// All on-disk paths covered by this entry
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            CompletedArchive::Single(path) => std::slice::from_ref(path),
            CompletedArchive::Volumes(paths) => paths,
        }
    }

    /// Whether `path` is (one of) the paths of this entry
    pub fn contains(&self, path: &Path) -> bool {
        self.paths().iter().any(|p| p == path)
    }
}

/// Event emitted to subscribers whenever reconciled state changes
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new path is being tracked
    Added {
        /// Archive ID
        id: ArchiveId,
        /// Path as dropped
        path: PathBuf,
    },

    /// A listing was applied
    Listed {
        /// Archive ID
        id: ArchiveId,
        /// Path after multi-volume consolidation
        path: PathBuf,
        /// Freshly computed totals
        counter: FileCounter,
    },

    /// A dropped volume path was folded into the record of its volume set
    Merged {
        /// The volume path that was discarded
        from: PathBuf,
        /// The canonical path that now owns it
        into: PathBuf,
    },

    /// A record left the registry
    Removed {
        /// Archive ID
        id: ArchiveId,
        /// Path of the removed record
        path: PathBuf,
        /// Why
        reason: RemovalReason,
    },

    /// The extractor started on an archive
    Running {
        /// Archive ID
        id: ArchiveId,
        /// Archive path
        path: PathBuf,
    },

    /// One listed entry was marked extracted
    EntryExtracted {
        /// Archive ID
        id: ArchiveId,
        /// Last path segment of the entry
        name: String,
        /// Counters after the increment
        counter: FileCounter,
    },

    /// An archive reached completion
    Completed {
        /// Archive ID
        id: ArchiveId,
        /// Paths to hand to follow-up actions
        archive: CompletedArchive,
    },
}
