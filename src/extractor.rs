//! Traits and types for the external extraction executor

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;
use crate::record::ArchiveRecord;
use crate::types::ProgressEvent;

/// Everything the extractor needs to unpack one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Archive path, the key every progress notification must carry
    pub path: PathBuf,
    /// Pass-through password
    pub password: Option<String>,
    /// Pass-through codepage
    pub codepage: Option<String>,
    /// Whether the archive has a single top-level directory; if not, the
    /// extractor is expected to create one around the contents
    pub has_root_dir: bool,
}

impl From<&ArchiveRecord> for ExtractRequest {
    fn from(record: &ArchiveRecord) -> Self {
        Self {
            path: record.path().to_path_buf(),
            password: record.password().map(str::to_string),
            codepage: record.codepage().map(str::to_string),
            has_root_dir: record.has_root_dir(),
        }
    }
}

/// Sending half of the progress stream handed to an extractor
///
/// Cloneable so several archives can report concurrently. Once the tracker
/// stops listening, sends are dropped.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    pub(crate) fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Send one notification, waiting for buffer space
    ///
    /// Returns false if the tracker is no longer listening.
    pub async fn send(&self, event: impl Into<ProgressEvent>) -> bool {
        let event = event.into();
        match self.tx.send(event).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!(archive = ?event.archive, "progress dropped, tracker stopped listening");
                false
            }
        }
    }

    /// Report that extraction of `archive` started
    pub async fn running(&self, archive: &Path) -> bool {
        self.send(ProgressEvent::running(archive)).await
    }

    /// Report one entry of `archive` written at `output` (relative to the target directory)
    pub async fn entry(&self, archive: &Path, output: impl Into<PathBuf>) -> bool {
        self.send(ProgressEvent::entry(archive, output)).await
    }

    /// Report that extraction of `archive` finished
    pub async fn completed(&self, archive: &Path) -> bool {
        self.send(ProgressEvent::completed(archive)).await
    }

    /// Whether the tracker stopped listening
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Trait for the process that actually unpacks archives
///
/// Implementations report progress through the given [`ProgressSender`]:
/// `Running` first, then `Ok(path)` for every entry written (paths relative to
/// `target_dir`, including the folder created for archives without a single
/// root directory), then `Completed`. The tracker tolerates duplicates and a
/// `Completed` that overtakes the last entries.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract one archive below `target_dir`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ExtractorFailed`] (or an I/O error) when the
    /// archive could not be extracted.
    async fn extract(
        &self,
        request: &ExtractRequest,
        target_dir: &Path,
        progress: ProgressSender,
    ) -> Result<()>;
}
