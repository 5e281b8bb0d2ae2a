//! Progress reconciliation
//!
//! Routes each progress notification to the record tracked under its archive
//! path and applies it:
//!
//! - `Running` moves a listed archive to `Running`.
//! - `Ok(path)` walks the record's tree along the segments of `path` (relative
//!   to the extraction target directory) and marks the entry it lands on
//!   extracted, once.
//! - `Completed` is advisory; completion is judged from the counters, which are
//!   re-checked after every `Ok` as well. The marker and the last entries may
//!   arrive in either order.
//!
//! Nothing here fails. Events for untracked archives and paths that select no
//! listed entry are dropped with a debug log.

use std::path::Path;
use tracing::{debug, info};

use crate::config::CompletionConfig;
use crate::record::ArchiveRecord;
use crate::registry::ArchiveRegistry;
use crate::tree::{FileTree, NodeId};
use crate::types::{ArchiveStatus, CompletedArchive, Event, ProgressEvent, ProgressStatus};
use crate::utils::{path_segments, segments};

/// Applies progress notifications to an [`ArchiveRegistry`]
#[derive(Clone, Debug, Default)]
pub struct ProgressReconciler {
    completion: CompletionConfig,
}

/// What one progress notification changed
#[derive(Clone, Debug, Default)]
pub struct Reconciled {
    /// Events describing the change, in order
    pub events: Vec<Event>,
    /// Set when the archive reached completion with this notification
    pub completed: Option<CompletedArchive>,
}

impl Reconciled {
    /// Whether the notification changed nothing
    pub fn is_unchanged(&self) -> bool {
        self.events.is_empty()
    }
}

impl ProgressReconciler {
    /// Reconciler judging completion with `completion`
    pub fn new(completion: CompletionConfig) -> Self {
        Self { completion }
    }

    /// Apply one notification
    pub fn apply(&self, registry: &mut ArchiveRegistry, event: &ProgressEvent) -> Reconciled {
        let mut out = Reconciled::default();
        let Some(record) = registry.get_mut(&event.archive) else {
            debug!(archive = ?event.archive, "progress for untracked archive ignored");
            return out;
        };

        match &event.status {
            ProgressStatus::Running => {
                if matches!(record.status, ArchiveStatus::Pending | ArchiveStatus::Listed) {
                    record.status = ArchiveStatus::Running;
                    info!(archive_id = record.id.0, archive = ?record.path, "extraction running");
                    out.events.push(Event::Running {
                        id: record.id,
                        path: record.path.clone(),
                    });
                }
            }
            ProgressStatus::Ok(path) => {
                let Some(node) = mark_entry(record, path) else {
                    return out;
                };
                let name = record
                    .tree
                    .get(node)
                    .and_then(|n| n.value.name())
                    .map(str::to_string)
                    .unwrap_or_else(|| record.currently_extracting_name.clone());
                out.events.push(Event::EntryExtracted {
                    id: record.id,
                    name,
                    counter: record.counter,
                });
                self.check_completion(registry, &event.archive, &mut out);
            }
            ProgressStatus::Completed => {
                if !record.is_complete(&self.completion) {
                    debug!(
                        archive_id = record.id.0,
                        archive = ?record.path,
                        directories_done = record.counter.directory.done,
                        directories_total = record.counter.directory.total,
                        files_done = record.counter.file.done,
                        files_total = record.counter.file.total,
                        "completion marker before all entries were reported"
                    );
                }
                self.check_completion(registry, &event.archive, &mut out);
            }
        }
        out
    }

    fn check_completion(&self, registry: &mut ArchiveRegistry, archive: &Path, out: &mut Reconciled) {
        let Some(record) = registry.get(archive) else {
            return;
        };
        if record.status == ArchiveStatus::Completed || !record.is_complete(&self.completion) {
            return;
        }
        let id = record.id;
        if let Some(done) = registry.mark_completed(archive) {
            out.events.push(Event::Completed {
                id,
                archive: done.clone(),
            });
            out.completed = Some(done);
        }
    }
}

/// Walk `tree` along `segments`, returning the node the last segment selects
///
/// Without a single root directory the root itself stands for the folder the
/// extractor creates, so it is matched against the first segment instead of
/// its children.
pub fn walk<S: AsRef<str>>(tree: &FileTree, has_root_dir: bool, segments: &[S]) -> Option<NodeId> {
    let (first, rest) = segments.split_first()?;
    let root = tree.root();
    let mut current = if has_root_dir {
        tree.find_child(root, first.as_ref())?
    } else if tree.get(root)?.value.matches_segment(first.as_ref()) {
        root
    } else {
        return None;
    };
    for segment in rest {
        current = tree.find_child(current, segment.as_ref())?;
    }
    Some(current)
}

/// Mark the entry `path` selects; `None` if it selects nothing or was already marked
fn mark_entry(record: &mut ArchiveRecord, path: &Path) -> Option<NodeId> {
    let parts = path_segments(path);
    let Some(node) = walk(&record.tree, record.has_root_dir, &parts) else {
        debug!(archive_id = record.id.0, entry = ?path, "progress path matches no listed entry");
        return None;
    };
    if !record.tree.mark_extracted(node) {
        debug!(archive_id = record.id.0, entry = ?path, "entry already extracted");
        return None;
    }
    let kind = record.tree.get(node)?.value.count_kind();
    if !record.counter.mark_done(kind) {
        debug!(archive_id = record.id.0, entry = ?path, ?kind, "counter already at total");
    }
    if let Some(last) = parts.last() {
        record.currently_extracting_name.clone_from(last);
    }
    debug!(archive_id = record.id.0, entry = ?path, "entry extracted");
    Some(node)
}

/// Walk a `/` or `\` separated string path; see [`walk`]
pub fn walk_str(tree: &FileTree, has_root_dir: bool, path: &str) -> Option<NodeId> {
    walk(tree, has_root_dir, &segments(path))
}
