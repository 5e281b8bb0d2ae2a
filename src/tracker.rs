//! The tracker service: registry, reconciler and event broadcast in one place
//!
//! Mutation goes through `&mut self`, one event at a time, so no locks are
//! involved. Listing fetches and extractions run concurrently, but their results
//! are applied from the single task driving the tracker.

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, ListingError, RemovalReason, Result};
use crate::extractor::{ArchiveExtractor, ExtractRequest, ProgressSender};
use crate::listing::{ArchiveLister, Listing};
use crate::reconciler::ProgressReconciler;
use crate::registry::{ArchiveRegistry, Tracked};
use crate::types::{ArchiveId, ArchiveStatus, CompletedArchive, Event, ProgressEvent};

/// What [`UnzipTracker::run_extraction`] observed while the executor ran
#[derive(Debug)]
pub struct ExtractionOutcome<T> {
    /// The executor's own result
    pub output: T,
    /// Archives that reached completion during the run, in order
    pub completed: Vec<CompletedArchive>,
}

/// Result of [`UnzipTracker::unzip_all`]
#[derive(Debug, Default)]
pub struct UnzipReport {
    /// Archives that reached completion
    pub completed: Vec<CompletedArchive>,
    /// Archives the extractor failed on
    pub failed: Vec<(PathBuf, Error)>,
}

/// Tracks dropped archives from listing through extraction
///
/// # Example
///
/// ```
/// use unzip_progress::{Config, UnzipTracker};
/// use unzip_progress::listing::{Listing, ListingEntry};
/// use unzip_progress::types::ProgressEvent;
/// use std::path::Path;
///
/// let mut tracker = UnzipTracker::new(Config::default())?;
/// tracker.add_paths(["a.zip"]);
/// let listing = Listing::from_entries(
///     "a.zip",
///     vec![ListingEntry::file("notes.txt"), ListingEntry::file("todo.txt")],
/// );
/// tracker.apply_listing_result(Path::new("a.zip"), Ok(listing))?;
///
/// // two top-level files: the extractor wraps them into a folder of its own
/// tracker.handle_progress(&ProgressEvent::entry("a.zip", "a/notes.txt"));
/// let done = tracker.handle_progress(&ProgressEvent::entry("a.zip", "a/todo.txt"));
/// assert!(done.is_some());
/// # Ok::<(), unzip_progress::Error>(())
/// ```
pub struct UnzipTracker {
    registry: ArchiveRegistry,
    reconciler: ProgressReconciler,
    event_tx: broadcast::Sender<Event>,
    config: Config,
}

impl UnzipTracker {
    /// Create a tracker after validating `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = broadcast::channel(config.event_channel_capacity);
        Ok(Self {
            registry: ArchiveRegistry::new(),
            reconciler: ProgressReconciler::new(config.completion.clone()),
            event_tx,
            config,
        })
    }

    /// Subscribe to tracker events
    ///
    /// Every subscriber gets its own receiver; events sent while nobody is
    /// subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of the tracked archives
    pub fn registry(&self) -> &ArchiveRegistry {
        &self.registry
    }

    fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Start tracking dropped paths, returning their ids in the same order
    pub fn add_paths<I, P>(&mut self, paths: I) -> Vec<ArchiveId>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths
            .into_iter()
            .map(|path| {
                let path = path.into();
                match self.registry.add(path.clone()) {
                    Tracked::New(id) => {
                        self.emit_event(Event::Added { id, path });
                        id
                    }
                    Tracked::Existing(id) => id,
                }
            })
            .collect()
    }

    /// Apply what the lister returned for `path`
    ///
    /// A successful listing installs the tree (consolidating volume sets); a
    /// failure removes the record and is returned as [`Error::Listing`].
    pub fn apply_listing_result(
        &mut self,
        path: &Path,
        result: std::result::Result<Listing, ListingError>,
    ) -> Result<ArchiveId> {
        match result {
            Ok(listing) => {
                let applied = self.registry.apply_listing(path, listing)?;
                for (merged_id, from) in applied.merged {
                    self.emit_event(Event::Merged {
                        from: from.clone(),
                        into: applied.path.clone(),
                    });
                    self.emit_event(Event::Removed {
                        id: merged_id,
                        path: from,
                        reason: RemovalReason::MergedIntoVolumeSet(applied.path.clone()),
                    });
                }
                self.emit_event(Event::Listed {
                    id: applied.id,
                    path: applied.path,
                    counter: applied.counter,
                });
                Ok(applied.id)
            }
            Err(err) => {
                let (record, reason) = if err.is_unsupported() {
                    (self.registry.unsupported(path)?, RemovalReason::Unsupported)
                } else {
                    self.registry.apply_listing_error(path, &err)?
                };
                warn!(
                    archive_id = record.id().0,
                    archive = ?path,
                    error = %err,
                    "listing failed, archive removed"
                );
                self.emit_event(Event::Removed {
                    id: record.id(),
                    path: record.path().to_path_buf(),
                    reason,
                });
                Err(Error::Listing(err))
            }
        }
    }

    /// Track `paths` and fetch listings for every one still `Pending`
    ///
    /// Up to `max_concurrent_listings` fetches run at once; each result is
    /// applied as soon as it arrives. Returns the ids of archives listed.
    pub async fn load_listings<L, I, P>(&mut self, lister: &L, paths: I) -> Vec<ArchiveId>
    where
        L: ArchiveLister + ?Sized,
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        self.add_paths(paths.iter().cloned());

        let pending: Vec<(PathBuf, Option<String>, Option<String>)> = paths
            .into_iter()
            .filter_map(|path| {
                let record = self.registry.get(&path)?;
                (record.status() == ArchiveStatus::Pending && record.path() == path).then(|| {
                    (
                        path,
                        record.password().map(str::to_string),
                        record.codepage().map(str::to_string),
                    )
                })
            })
            .collect();

        let mut results = stream::iter(pending)
            .map(|(path, password, codepage)| async move {
                let result = lister
                    .list(&path, password.as_deref(), codepage.as_deref())
                    .await;
                (path, result)
            })
            .buffer_unordered(self.config.max_concurrent_listings);

        let mut listed = Vec::new();
        while let Some((path, result)) = results.next().await {
            match self.apply_listing_result(&path, result) {
                Ok(id) => listed.push(id),
                Err(Error::NotTracked(_)) => {
                    debug!(archive = ?path, "listing for archive no longer tracked ignored");
                }
                Err(_) => {}
            }
        }
        listed
    }

    /// Reconcile one progress notification and emit what changed
    ///
    /// Returns the archive's paths when this notification completed it.
    pub fn handle_progress(&mut self, event: &ProgressEvent) -> Option<CompletedArchive> {
        let reconciled = self.reconciler.apply(&mut self.registry, event);
        for event in reconciled.events {
            self.emit_event(event);
        }
        reconciled.completed
    }

    /// Drive an extraction executor while reconciling its progress
    ///
    /// `executor` receives the sending half of a fresh progress channel. Events
    /// are reconciled while it runs; after it finishes, events still buffered
    /// (or sent by clones it handed elsewhere) are drained until every sender is
    /// gone. The channel is released when this returns, whatever the executor's
    /// result was.
    pub async fn run_extraction<F, Fut, T>(&mut self, executor: F) -> ExtractionOutcome<T>
    where
        F: FnOnce(ProgressSender) -> Fut,
        Fut: Future<Output = T>,
    {
        let (tx, mut rx) = mpsc::channel(self.config.progress_channel_capacity);
        // fused so the executor (and any sender it still holds) is dropped on completion
        let fut = executor(ProgressSender::new(tx)).fuse();
        tokio::pin!(fut);

        let mut output = None;
        let mut completed = Vec::new();
        loop {
            tokio::select! {
                result = &mut fut, if output.is_none() => {
                    output = Some(result);
                }
                event = rx.recv() => match event {
                    Some(event) => completed.extend(self.handle_progress(&event)),
                    None => break,
                },
            }
        }
        drop(rx);

        let output = match output {
            Some(output) => output,
            None => fut.await,
        };
        ExtractionOutcome { output, completed }
    }

    /// Extract every `Listed` archive below `target_dir`
    ///
    /// Up to `max_concurrent_extractions` archives are extracted at once; a
    /// failing archive does not stop the others.
    pub async fn unzip_all<E>(&mut self, extractor: &E, target_dir: &Path) -> UnzipReport
    where
        E: ArchiveExtractor + ?Sized,
    {
        let requests: Vec<ExtractRequest> = self
            .registry
            .records()
            .filter(|r| r.status() == ArchiveStatus::Listed)
            .map(ExtractRequest::from)
            .collect();
        if requests.is_empty() {
            debug!("nothing to extract");
            return UnzipReport::default();
        }
        info!(archives = requests.len(), target = ?target_dir, "extracting archives");

        let concurrency = self.config.max_concurrent_extractions;
        let outcome = self
            .run_extraction(|progress| {
                stream::iter(requests)
                    .map(move |request| {
                        let progress = progress.clone();
                        async move {
                            let result = extractor.extract(&request, target_dir, progress).await;
                            (request.path, result)
                        }
                    })
                    .buffer_unordered(concurrency)
                    .collect::<Vec<_>>()
            })
            .await;

        let mut report = UnzipReport {
            completed: outcome.completed,
            failed: Vec::new(),
        };
        for (path, result) in outcome.output {
            if let Err(e) = result {
                warn!(archive = ?path, error = %e, "extraction failed");
                report.failed.push((path, e));
            }
        }
        report
    }

    /// Stop tracking the archive addressed by `path`
    ///
    /// Further progress for it is dropped.
    pub fn remove(&mut self, path: &Path) -> Result<ArchiveId> {
        let record = self.registry.remove(path)?;
        info!(archive_id = record.id().0, archive = ?record.path(), "archive removed");
        self.emit_event(Event::Removed {
            id: record.id(),
            path: record.path().to_path_buf(),
            reason: RemovalReason::UserRemoved,
        });
        Ok(record.id())
    }

    /// Stop tracking everything
    pub fn remove_all(&mut self) {
        for record in self.registry.remove_all() {
            self.emit_event(Event::Removed {
                id: record.id(),
                path: record.path().to_path_buf(),
                reason: RemovalReason::UserRemoved,
            });
        }
    }

    /// Forget the listing and progress of `path`; the next
    /// [`load_listings`](Self::load_listings) lists it again
    pub fn refresh(&mut self, path: &Path) -> Result<ArchiveId> {
        let id = self.registry.refresh(path)?;
        info!(archive_id = id.0, archive = ?path, "archive refreshed");
        Ok(id)
    }

    /// Set the password passed to the lister and extractor
    pub fn set_password(&mut self, path: &Path, password: Option<String>) -> Result<()> {
        self.registry.set_password(path, password)
    }

    /// Set the codepage passed to the lister and extractor
    pub fn set_codepage(&mut self, path: &Path, codepage: Option<String>) -> Result<()> {
        self.registry.set_codepage(path, codepage)
    }
}
