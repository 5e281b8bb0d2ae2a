//! Archive listings as delivered by the external lister
//!
//! A [`Listing`] is the full tree of one archive plus the pass-through values
//! (password, codepage) the lister used and its multi-volume findings. Listings
//! can be assembled from flat [`ListingEntry`] records or parsed from 7-Zip's
//! technical listing with [`slt::parse_slt`].

pub mod slt;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::ListingError;
use crate::multi_volume::MultiVolumeInfo;
use crate::tree::FileTree;

/// One flat entry of a listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    /// Path inside the archive, with `/` or `\` separators
    pub path: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Modification time, if reported
    pub modified: Option<NaiveDateTime>,
}

impl ListingEntry {
    /// Regular file entry
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            modified: None,
        }
    }

    /// Directory entry
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            modified: None,
        }
    }
}

/// Full listing of one archive
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Path the listing was produced for
    pub path: PathBuf,
    /// Content tree, rooted at a placeholder
    pub tree: FileTree,
    /// Password that opened the archive (opaque)
    pub password: Option<String>,
    /// Codepage the names were decoded with (opaque)
    pub codepage: Option<String>,
    /// Volume set, when the archive spans several files
    pub multi_volume: Option<MultiVolumeInfo>,
    /// Whether everything sits below one top-level directory
    pub has_root_dir: bool,
}

impl Listing {
    /// Listing with an empty tree
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tree: FileTree::new(),
            password: None,
            codepage: None,
            multi_volume: None,
            has_root_dir: true,
        }
    }

    /// Build the tree from flat entries, then sort it and derive `has_root_dir`
    pub fn from_entries(
        path: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = ListingEntry>,
    ) -> Self {
        let mut listing = Self::new(path);
        for entry in entries {
            listing
                .tree
                .append_path(&entry.path, entry.is_dir, entry.modified);
        }
        listing.tree.sort();
        listing.has_root_dir = listing.tree.has_single_root();
        listing
    }

    /// Set the password; an empty string means none
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    /// Set the codepage
    pub fn with_codepage(mut self, codepage: Option<String>) -> Self {
        self.codepage = codepage;
        self
    }

    /// Attach volume set information
    pub fn with_multi_volume(mut self, multi_volume: MultiVolumeInfo) -> Self {
        self.multi_volume = Some(multi_volume);
        self
    }

    /// Path identifying the logical archive: the canonical volume path for
    /// multi-volume archives, otherwise the listed path
    pub fn canonical_path(&self) -> &Path {
        self.multi_volume
            .as_ref()
            .map(|mv| mv.canonical_path.as_path())
            .unwrap_or(&self.path)
    }
}

/// Source of archive listings
///
/// Implementations typically run an external tool; the tracker only needs the
/// resulting tree.
#[async_trait]
pub trait ArchiveLister: Send + Sync {
    /// List `path`, opening it with the given pass-through password and codepage
    async fn list(
        &self,
        path: &Path,
        password: Option<&str>,
        codepage: Option<&str>,
    ) -> Result<Listing, ListingError>;
}
