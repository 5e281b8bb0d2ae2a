//! Per-archive directory/file counters and the completion rule

use serde::{Deserialize, Serialize};

/// Total and done count for one kind of entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    /// Entries of this kind expected from the listing
    pub total: u64,
    /// Entries of this kind reported extracted so far
    pub done: u64,
}

impl KindCount {
    /// Whether every expected entry has been reported
    pub fn is_finished(&self) -> bool {
        self.done == self.total
    }
}

/// Kind of entry a counter increment applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountKind {
    /// Directory (including the synthetic root placeholder)
    Directory,
    /// Regular file
    File,
}

/// `{directory, file} x {total, done}` for one archive
///
/// Totals are fixed when a listing is applied; `done` only grows, and never
/// past `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounter {
    /// Directory counts
    pub directory: KindCount,
    /// File counts
    pub file: KindCount,
}

impl FileCounter {
    /// Counter with the given totals and nothing done
    pub fn with_totals(directories: u64, files: u64) -> Self {
        Self {
            directory: KindCount {
                total: directories,
                done: 0,
            },
            file: KindCount {
                total: files,
                done: 0,
            },
        }
    }

    /// Count one more extracted entry of `kind`
    ///
    /// Returns false, leaving the counter untouched, if that kind is already at
    /// its total.
    pub fn mark_done(&mut self, kind: CountKind) -> bool {
        let slot = match kind {
            CountKind::Directory => &mut self.directory,
            CountKind::File => &mut self.file,
        };
        if slot.done >= slot.total {
            return false;
        }
        slot.done += 1;
        true
    }

    /// See [`is_complete`]
    pub fn is_complete(&self) -> bool {
        is_complete(self)
    }
}

/// Completion rule: something was extracted and every total has been reached
///
/// An all-zero counter (not yet listed, or an empty archive) is never complete.
///
/// # Examples
///
/// ```
/// use unzip_progress::{FileCounter, counter::is_complete};
///
/// let mut counter = FileCounter::with_totals(1, 1);
/// assert!(!is_complete(&counter));
/// counter.directory.done = 1;
/// counter.file.done = 1;
/// assert!(is_complete(&counter));
/// assert!(!is_complete(&FileCounter::default()));
/// ```
pub fn is_complete(counter: &FileCounter) -> bool {
    (counter.directory.done > 0 || counter.file.done > 0)
        && counter.directory.is_finished()
        && counter.file.is_finished()
}
