//! The set of tracked archives and multi-volume consolidation
//!
//! Records keep insertion order. Ids come from a counter that only grows, so an
//! id is never handed out twice even after its record is removed.
//!
//! Besides the records the registry keeps the list of archives that reached
//! completion, which follow-up actions (cleanup of extracted archives) consume.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::counter::FileCounter;
use crate::error::{Error, ListingError, RemovalReason, Result};
use crate::listing::Listing;
use crate::record::ArchiveRecord;
use crate::types::{ArchiveId, ArchiveStatus, CompletedArchive};

/// Result of [`ArchiveRegistry::add`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracked {
    /// A new `Pending` record was created
    New(ArchiveId),
    /// The path was already tracked (directly or as a volume) by this record
    Existing(ArchiveId),
}

impl Tracked {
    /// Id of the record tracking the path
    pub fn id(&self) -> ArchiveId {
        match self {
            Tracked::New(id) | Tracked::Existing(id) => *id,
        }
    }
}

/// What applying a listing did to the registry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingApplied {
    /// Record that received the listing
    pub id: ArchiveId,
    /// Its path after consolidation
    pub path: PathBuf,
    /// Freshly computed totals
    pub counter: FileCounter,
    /// Records discarded because they were volumes of this archive
    pub merged: Vec<(ArchiveId, PathBuf)>,
}

/// Tracked archives, keyed by id and addressed by path
#[derive(Debug, Default)]
pub struct ArchiveRegistry {
    records: Vec<ArchiveRecord>,
    next_id: u64,
    completed: Vec<CompletedArchive>,
    recently_completed: Option<CompletedArchive>,
}

impl ArchiveRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked archives
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &ArchiveRecord> {
        self.records.iter()
    }

    /// Record addressed by `path`, either as its path or as one of its volumes
    pub fn get(&self, path: &Path) -> Option<&ArchiveRecord> {
        self.find(path).map(|idx| &self.records[idx])
    }

    /// Record by id
    pub fn get_by_id(&self, id: ArchiveId) -> Option<&ArchiveRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut ArchiveRecord> {
        let idx = self.find(path)?;
        self.records.get_mut(idx)
    }

    /// Archives that reached completion, oldest first
    pub fn completed(&self) -> &[CompletedArchive] {
        &self.completed
    }

    /// The archive that reached completion last, if still tracked as completed
    pub fn recently_completed(&self) -> Option<&CompletedArchive> {
        self.recently_completed.as_ref()
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.records.iter().position(|r| r.path == path)
    }

    fn find(&self, path: &Path) -> Option<usize> {
        self.position(path)
            .or_else(|| self.records.iter().position(|r| r.answers_to(path)))
    }

    fn position_or_err(&self, path: &Path) -> Result<usize> {
        self.position(path)
            .ok_or_else(|| Error::NotTracked(path.to_path_buf()))
    }

    /// Start tracking `path` as a `Pending` record
    ///
    /// Paths already tracked, including volumes of a consolidated archive,
    /// return the existing record's id.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Tracked {
        let path = path.into();
        if let Some(idx) = self.find(&path) {
            return Tracked::Existing(self.records[idx].id);
        }
        self.next_id += 1;
        let id = ArchiveId(self.next_id);
        debug!(archive_id = id.0, archive = ?path, "tracking archive");
        self.records.push(ArchiveRecord::pending(id, path));
        Tracked::New(id)
    }

    /// Install a listing on the record tracked at exactly `path`
    ///
    /// For a multi-volume listing whose canonical path differs from `path` and
    /// is already tracked, the record at `path` is discarded and the canonical
    /// record receives the listing. Otherwise the record at `path` receives it
    /// and is moved to the canonical path. Any other record tracking one of the
    /// volumes is discarded as well, leaving one record per volume set.
    pub fn apply_listing(&mut self, path: &Path, listing: Listing) -> Result<ListingApplied> {
        let mut idx = self.position_or_err(path)?;
        let mut merged = Vec::new();

        if let Some(mv) = &listing.multi_volume {
            let canonical = mv.canonical_path.clone();
            if canonical != path
                && let Some(target) = self.position(&canonical)
            {
                let removed = self.records.remove(idx);
                merged.push((removed.id, removed.path));
                idx = if target > idx { target - 1 } else { target };
            }

            let record = &mut self.records[idx];
            record.path = canonical;
            let id = record.id;
            let volumes = mv.volumes.clone();
            let (stale, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
                .into_iter()
                .partition(|r| r.id != id && volumes.contains(&r.path));
            self.records = kept;
            merged.extend(stale.into_iter().map(|r| (r.id, r.path)));
            idx = self
                .records
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| Error::NotTracked(path.to_path_buf()))?;
        }

        let record = &mut self.records[idx];
        record.install(listing);
        for (merged_id, merged_path) in &merged {
            info!(
                archive_id = merged_id.0,
                archive = ?merged_path,
                into = ?record.path,
                "merged volume into its archive"
            );
        }
        info!(
            archive_id = record.id.0,
            archive = ?record.path,
            directories = record.counter.directory.total,
            files = record.counter.file.total,
            "archive listed"
        );
        Ok(ListingApplied {
            id: record.id,
            path: record.path.clone(),
            counter: record.counter,
            merged,
        })
    }

    /// Drop the record at `path` because listing it failed
    ///
    /// Returns the removed record with the reason to report.
    pub fn apply_listing_error(
        &mut self,
        path: &Path,
        err: &ListingError,
    ) -> Result<(ArchiveRecord, RemovalReason)> {
        let idx = self.position_or_err(path)?;
        let record = self.records.remove(idx);
        self.purge_completed(&record.paths());
        Ok((record, RemovalReason::from(err)))
    }

    /// Drop the record at `path` because it cannot be listed at all
    pub fn unsupported(&mut self, path: &Path) -> Result<ArchiveRecord> {
        let idx = self.position_or_err(path)?;
        let record = self.records.remove(idx);
        self.purge_completed(&record.paths());
        Ok(record)
    }

    /// Remove the record addressed by `path`, forgetting every one of its
    /// paths in the completed list
    pub fn remove(&mut self, path: &Path) -> Result<ArchiveRecord> {
        let idx = self
            .find(path)
            .ok_or_else(|| Error::NotTracked(path.to_path_buf()))?;
        let record = self.records.remove(idx);
        self.purge_completed(&record.paths());
        Ok(record)
    }

    /// Remove everything
    pub fn remove_all(&mut self) -> Vec<ArchiveRecord> {
        self.completed.clear();
        self.recently_completed = None;
        std::mem::take(&mut self.records)
    }

    /// Discard tree, counters and progress of the record at `path`
    ///
    /// The record goes back to `Pending` and waits for a new listing.
    pub fn refresh(&mut self, path: &Path) -> Result<ArchiveId> {
        let idx = self.position_or_err(path)?;
        let record = &mut self.records[idx];
        record.reset();
        let id = record.id;
        let paths = record.paths();
        self.purge_completed(&paths);
        Ok(id)
    }

    /// Set the pass-through password
    pub fn set_password(&mut self, path: &Path, password: Option<String>) -> Result<()> {
        let idx = self.position_or_err(path)?;
        self.records[idx].password = password.filter(|p| !p.is_empty());
        Ok(())
    }

    /// Set the pass-through codepage
    pub fn set_codepage(&mut self, path: &Path, codepage: Option<String>) -> Result<()> {
        let idx = self.position_or_err(path)?;
        self.records[idx].codepage = codepage;
        Ok(())
    }

    /// Move the record at `path` to `Completed` and remember its paths
    ///
    /// Returns the paths only on the transition.
    pub(crate) fn mark_completed(&mut self, path: &Path) -> Option<CompletedArchive> {
        let idx = self.find(path)?;
        let record = &mut self.records[idx];
        if record.status == ArchiveStatus::Completed {
            return None;
        }
        record.status = ArchiveStatus::Completed;
        let archive = record.completed_archive();
        info!(archive_id = record.id.0, archive = ?record.path, "archive completed");
        if !self.completed.contains(&archive) {
            self.completed.push(archive.clone());
        }
        self.recently_completed = Some(archive.clone());
        Some(archive)
    }

    fn purge_completed(&mut self, paths: &[PathBuf]) {
        let answers = |entry: &CompletedArchive| entry.paths().iter().any(|p| paths.contains(p));
        self.completed.retain(|entry| !answers(entry));
        if self.recently_completed.as_ref().is_some_and(answers) {
            self.recently_completed = None;
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingEntry;
    use crate::multi_volume::MultiVolumeInfo;

    fn split_7z_listing(path: &str) -> Listing {
        Listing::from_entries(path, vec![ListingEntry::file("movie.mkv")]).with_multi_volume(
            MultiVolumeInfo {
                volumes: vec!["a.7z.001".into(), "a.7z.002".into()],
                canonical_path: "a.7z.001".into(),
            },
        )
    }

    #[test]
    fn add_is_a_no_op_for_tracked_paths() {
        let mut registry = ArchiveRegistry::new();
        let first = registry.add("a.zip");
        let again = registry.add("a.zip");
        assert!(matches!(first, Tracked::New(_)));
        assert_eq!(again, Tracked::Existing(first.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = ArchiveRegistry::new();
        let a = registry.add("a.zip").id();
        registry.remove(Path::new("a.zip")).unwrap();
        let b = registry.add("a.zip").id();
        assert_ne!(a, b);
    }

    #[test]
    fn listing_an_untracked_path_fails() {
        let mut registry = ArchiveRegistry::new();
        let err = registry
            .apply_listing(Path::new("ghost.zip"), Listing::new("ghost.zip"))
            .unwrap_err();
        assert!(matches!(err, Error::NotTracked(_)));
    }

    #[test]
    fn listing_sets_totals_and_status() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.zip");
        let listing = Listing::from_entries(
            "a.zip",
            vec![ListingEntry::dir("docs"), ListingEntry::file("docs/readme.txt")],
        );
        let applied = registry.apply_listing(Path::new("a.zip"), listing).unwrap();
        assert_eq!(applied.counter, FileCounter::with_totals(1, 1));
        assert!(applied.merged.is_empty());

        let record = registry.get(Path::new("a.zip")).unwrap();
        assert_eq!(record.status(), ArchiveStatus::Listed);
        assert!(record.has_root_dir());
    }

    #[test]
    fn volumes_collapse_into_one_record() {
        let mut registry = ArchiveRegistry::new();
        let first = registry.add("a.7z.001").id();
        let second = registry.add("a.7z.002").id();

        let applied = registry
            .apply_listing(Path::new("a.7z.001"), split_7z_listing("a.7z.001"))
            .unwrap();
        assert_eq!(applied.id, first);
        assert_eq!(applied.merged, vec![(second, PathBuf::from("a.7z.002"))]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(Path::new("a.7z.002")).unwrap().id(), first);
        assert_eq!(registry.add("a.7z.002"), Tracked::Existing(first));
    }

    #[test]
    fn later_volume_listing_goes_to_canonical_record() {
        let mut registry = ArchiveRegistry::new();
        let first = registry.add("a.7z.001").id();
        let second = registry.add("a.7z.002").id();

        let applied = registry
            .apply_listing(Path::new("a.7z.002"), split_7z_listing("a.7z.002"))
            .unwrap();
        assert_eq!(applied.id, first);
        assert_eq!(applied.path, PathBuf::from("a.7z.001"));
        assert_eq!(applied.merged, vec![(second, PathBuf::from("a.7z.002"))]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_id(second).is_none());
    }

    #[test]
    fn lone_volume_moves_to_canonical_path() {
        let mut registry = ArchiveRegistry::new();
        let id = registry.add("a.7z.002").id();
        registry
            .apply_listing(Path::new("a.7z.002"), split_7z_listing("a.7z.002"))
            .unwrap();
        let record = registry.get_by_id(id).unwrap();
        assert_eq!(record.path(), Path::new("a.7z.001"));
        assert!(record.multi_volume().is_some());
    }

    #[test]
    fn removing_a_volume_set_purges_every_volume() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.7z.001");
        registry.add("a.7z.002");
        registry.add("b.zip");
        registry
            .apply_listing(Path::new("a.7z.001"), split_7z_listing("a.7z.001"))
            .unwrap();
        registry
            .apply_listing(
                Path::new("b.zip"),
                Listing::from_entries("b.zip", vec![ListingEntry::file("x")]),
            )
            .unwrap();
        registry.mark_completed(Path::new("a.7z.001")).unwrap();
        registry.mark_completed(Path::new("b.zip")).unwrap();
        assert_eq!(registry.completed().len(), 2);

        registry.remove(Path::new("a.7z.002")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.completed(), &[CompletedArchive::Single("b.zip".into())]);
        assert!(
            registry
                .completed()
                .iter()
                .all(|c| !c.contains(Path::new("a.7z.001")) && !c.contains(Path::new("a.7z.002")))
        );
    }

    #[test]
    fn mark_completed_only_once() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.zip");
        assert!(registry.mark_completed(Path::new("a.zip")).is_some());
        assert!(registry.mark_completed(Path::new("a.zip")).is_none());
        assert_eq!(
            registry.recently_completed(),
            Some(&CompletedArchive::Single("a.zip".into()))
        );
        registry.remove(Path::new("a.zip")).unwrap();
        assert!(registry.recently_completed().is_none());
    }

    #[test]
    fn listing_failures_remove_with_reason() {
        let mut registry = ArchiveRegistry::new();
        registry.add("notes.txt");
        registry.add("secret.7z");

        let (record, reason) = registry
            .apply_listing_error(
                Path::new("notes.txt"),
                &ListingError::UnsupportedFile("notes.txt".into()),
            )
            .unwrap();
        assert_eq!(record.path(), Path::new("notes.txt"));
        assert_eq!(reason, RemovalReason::Unsupported);

        let (_, reason) = registry
            .apply_listing_error(
                Path::new("secret.7z"),
                &ListingError::NeedPassword("secret.7z".into()),
            )
            .unwrap();
        assert!(matches!(reason, RemovalReason::ListingFailed(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn unsupported_removes_without_processing() {
        let mut registry = ArchiveRegistry::new();
        registry.add("notes.txt");
        registry.unsupported(Path::new("notes.txt")).unwrap();
        assert!(registry.is_empty());
        assert!(registry.unsupported(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn unsupported_forgets_a_completed_archive() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.zip");
        registry.add("b.zip");
        registry.mark_completed(Path::new("a.zip")).unwrap();
        registry.mark_completed(Path::new("b.zip")).unwrap();

        registry.unsupported(Path::new("b.zip")).unwrap();
        assert_eq!(registry.completed(), &[CompletedArchive::Single("a.zip".into())]);
        assert!(registry.recently_completed().is_none());
    }

    #[test]
    fn refresh_returns_to_pending_keeping_id_and_pass_through() {
        let mut registry = ArchiveRegistry::new();
        let id = registry.add("a.zip").id();
        registry
            .set_password(Path::new("a.zip"), Some("pw".into()))
            .unwrap();
        registry
            .set_codepage(Path::new("a.zip"), Some("936".into()))
            .unwrap();
        registry
            .apply_listing(
                Path::new("a.zip"),
                Listing::from_entries("a.zip", vec![ListingEntry::file("x")])
                    .with_password("pw")
                    .with_codepage(Some("936".into())),
            )
            .unwrap();
        registry.mark_completed(Path::new("a.zip"));

        assert_eq!(registry.refresh(Path::new("a.zip")).unwrap(), id);
        let record = registry.get(Path::new("a.zip")).unwrap();
        assert_eq!(record.id(), id);
        assert_eq!(record.status(), ArchiveStatus::Pending);
        assert_eq!(record.counter(), FileCounter::default());
        assert_eq!(record.password(), Some("pw"));
        assert_eq!(record.codepage(), Some("936"));
        assert!(registry.completed().is_empty());
    }

    #[test]
    fn empty_password_clears_it() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.zip");
        registry
            .set_password(Path::new("a.zip"), Some(String::new()))
            .unwrap();
        assert_eq!(registry.get(Path::new("a.zip")).unwrap().password(), None);
    }

    #[test]
    fn remove_all_clears_records_and_completed() {
        let mut registry = ArchiveRegistry::new();
        registry.add("a.zip");
        registry.add("b.zip");
        registry.mark_completed(Path::new("a.zip"));
        let removed = registry.remove_all();
        assert_eq!(removed.len(), 2);
        assert!(registry.is_empty());
        assert!(registry.completed().is_empty());
        assert!(registry.recently_completed().is_none());
    }

    #[test]
    fn records_keep_insertion_order() {
        let mut registry = ArchiveRegistry::new();
        for name in ["c.zip", "a.zip", "b.zip"] {
            registry.add(name);
        }
        let paths: Vec<_> = registry.records().map(|r| r.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("c.zip"),
                PathBuf::from("a.zip"),
                PathBuf::from("b.zip")
            ]
        );
    }
}
