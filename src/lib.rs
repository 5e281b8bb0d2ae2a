//! # unzip-progress
//!
//! Archive content trees and live extraction progress reconciliation.
//!
//! An application drops archive paths onto the tracker, an external lister
//! supplies each archive's full content tree, and an external extractor reports
//! progress as a stream of `(archive path, status)` notifications. The tracker
//! matches every reported path against the listed tree, marks each entry
//! extracted exactly once and keeps per-archive directory/file counters from
//! which completion is derived.
//!
//! ## Design
//!
//! - **Counter-derived completion** - an archive is complete when every listed
//!   entry has been reported, whatever order the extractor's notifications arrive in
//! - **Idempotent** - duplicate notifications never double-count
//! - **Unicode-aware matching** - names are compared under canonical equivalence
//! - **One record per volume set** - `a.7z.001`, `a.7z.002`, ... collapse into one
//!   tracked archive once the listing reports the set
//! - **Event-driven** - consumers subscribe to [`Event`]s, no polling required
//!
//! ## Quick Start
//!
//! ```
//! use async_trait::async_trait;
//! use std::path::Path;
//! use unzip_progress::listing::{ArchiveLister, Listing, slt::parse_slt};
//! use unzip_progress::{Config, ListingError, UnzipTracker};
//!
//! struct SevenZipOutput(&'static str);
//!
//! #[async_trait]
//! impl ArchiveLister for SevenZipOutput {
//!     async fn list(
//!         &self,
//!         path: &Path,
//!         _password: Option<&str>,
//!         _codepage: Option<&str>,
//!     ) -> Result<Listing, ListingError> {
//!         parse_slt(path, self.0)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tracker = UnzipTracker::new(Config::default())?;
//!
//!     let mut events = tracker.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let lister = SevenZipOutput("----------\nPath = docs\nFolder = +\n\nPath = docs/a.txt\n");
//!     let listed = tracker.load_listings(&lister, ["/data/a.zip"]).await;
//!     assert_eq!(listed.len(), 1);
//!
//!     let record = tracker.registry().get(Path::new("/data/a.zip")).unwrap();
//!     println!("{}", record.tree());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Per-archive counters and the completion rule
pub mod counter;
/// Error types
pub mod error;
/// Extraction executor seam
pub mod extractor;
/// Archive listings and the lister seam
pub mod listing;
/// Multi-volume naming conventions
pub mod multi_volume;
/// Progress reconciliation
pub mod reconciler;
/// Tracked archive records
pub mod record;
/// Archive registry and volume set consolidation
pub mod registry;
/// The tracker service
pub mod tracker;
/// Archive content trees
pub mod tree;
/// Core types and events
pub mod types;
/// Path segment splitting and comparison
pub mod utils;

// Re-export commonly used types
pub use config::{CompletionConfig, Config};
pub use counter::{FileCounter, KindCount};
pub use error::{Error, ListingError, RemovalReason, Result};
pub use extractor::{ArchiveExtractor, ExtractRequest, ProgressSender};
pub use listing::{ArchiveLister, Listing, ListingEntry};
pub use multi_volume::MultiVolumeInfo;
pub use reconciler::ProgressReconciler;
pub use record::ArchiveRecord;
pub use registry::ArchiveRegistry;
pub use tracker::{ExtractionOutcome, UnzipReport, UnzipTracker};
pub use tree::{FileTree, NodeId, NodeValue};
pub use types::{
    ArchiveId, ArchiveStatus, CompletedArchive, Event, ProgressEvent, ProgressStatus,
};
