//! One tracked archive

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::CompletionConfig;
use crate::counter::FileCounter;
use crate::listing::Listing;
use crate::multi_volume::MultiVolumeInfo;
use crate::tree::FileTree;
use crate::types::{ArchiveId, ArchiveStatus, CompletedArchive};

/// A tracked archive: its tree, counters and lifecycle
///
/// The tree and counter are only mutated through the registry and the
/// reconciler; everything else reads them.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    pub(crate) id: ArchiveId,
    pub(crate) path: PathBuf,
    pub(crate) password: Option<String>,
    pub(crate) codepage: Option<String>,
    pub(crate) tree: FileTree,
    pub(crate) has_root_dir: bool,
    pub(crate) counter: FileCounter,
    pub(crate) multi_volume: Option<MultiVolumeInfo>,
    pub(crate) status: ArchiveStatus,
    pub(crate) currently_extracting_name: String,
}

impl ArchiveRecord {
    /// Fresh `Pending` record: placeholder tree, zero counters
    pub(crate) fn pending(id: ArchiveId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            password: None,
            codepage: None,
            tree: FileTree::new(),
            has_root_dir: true,
            counter: FileCounter::default(),
            multi_volume: None,
            status: ArchiveStatus::Pending,
            currently_extracting_name: String::new(),
        }
    }

    /// Install a listing: new tree, totals computed once, status `Listed`
    ///
    /// The listing's own path is not copied; path rewriting for volume sets is
    /// the registry's job.
    pub(crate) fn install(&mut self, listing: Listing) {
        self.counter = listing.tree.count_all(listing.has_root_dir);
        self.tree = listing.tree;
        self.has_root_dir = listing.has_root_dir;
        self.password = listing.password;
        self.codepage = listing.codepage;
        self.multi_volume = listing.multi_volume;
        self.status = ArchiveStatus::Listed;
        self.currently_extracting_name.clear();
    }

    /// Discard tree, counters and progress, keeping path and pass-through values
    pub(crate) fn reset(&mut self) {
        self.tree = FileTree::new();
        self.has_root_dir = true;
        self.counter = FileCounter::default();
        self.status = ArchiveStatus::Pending;
        self.currently_extracting_name.clear();
    }

    /// Stable identifier
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    /// Path currently used to address the archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pass-through password
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Pass-through codepage
    pub fn codepage(&self) -> Option<&str> {
        self.codepage.as_deref()
    }

    /// Content tree
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Whether the listing had a single top-level directory
    pub fn has_root_dir(&self) -> bool {
        self.has_root_dir
    }

    /// Counter snapshot
    pub fn counter(&self) -> FileCounter {
        self.counter
    }

    /// Volume set, if any
    pub fn multi_volume(&self) -> Option<&MultiVolumeInfo> {
        self.multi_volume.as_ref()
    }

    /// Lifecycle status
    pub fn status(&self) -> ArchiveStatus {
        self.status
    }

    /// Last entry name reported by the extractor (display only)
    pub fn currently_extracting_name(&self) -> &str {
        &self.currently_extracting_name
    }

    /// Whether `path` addresses this record, directly or as one of its volumes
    pub fn answers_to(&self, path: &Path) -> bool {
        self.path == path
            || self
                .multi_volume
                .as_ref()
                .is_some_and(|mv| mv.contains(path))
    }

    /// Every on-disk path of the archive: its path plus any volumes
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.path.clone()];
        if let Some(mv) = &self.multi_volume {
            paths.extend(mv.volumes.iter().filter(|v| **v != self.path).cloned());
        }
        paths
    }

    /// Whether the synthetic root is expected but has not been reported
    fn synthetic_root_pending(&self) -> bool {
        !self.has_root_dir
            && self
                .tree
                .get(self.tree.root())
                .is_some_and(|root| !root.is_extracted())
    }

    /// Completion judged under `policy`
    ///
    /// With the default policy the synthetic root is optional: if the
    /// extractor never reported it, one directory less is required.
    pub fn is_complete(&self, policy: &CompletionConfig) -> bool {
        if self.counter.is_complete() {
            return true;
        }
        if policy.require_synthetic_root || !self.synthetic_root_pending() {
            return false;
        }
        let mut relaxed = self.counter;
        relaxed.directory.total = relaxed.directory.total.saturating_sub(1);
        relaxed.is_complete()
    }

    /// Paths to hand to follow-up actions once complete
    pub fn completed_archive(&self) -> CompletedArchive {
        match &self.multi_volume {
            Some(mv) if !mv.volumes.is_empty() => CompletedArchive::Volumes(mv.volumes.clone()),
            _ => CompletedArchive::Single(self.path.clone()),
        }
    }
}
