//! Scripted lister and extractor implementations

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use unzip_progress::listing::slt::parse_slt;
use unzip_progress::{
    ArchiveExtractor, ArchiveLister, Error, ExtractRequest, Listing, ListingError,
    ProgressSender, ProgressStatus, Result,
};

/// Lister answering from canned `7z l -slt` outputs or errors
#[derive(Default)]
pub struct ScriptedLister {
    outputs: HashMap<PathBuf, std::result::Result<&'static str, ListingError>>,
    calls: Mutex<Vec<(PathBuf, Option<String>, Option<String>)>>,
}

impl ScriptedLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, path: &str, output: &'static str) -> Self {
        self.outputs.insert(PathBuf::from(path), Ok(output));
        self
    }

    pub fn with_error(mut self, path: &str, error: ListingError) -> Self {
        self.outputs.insert(PathBuf::from(path), Err(error));
        self
    }

    /// Paths listed so far with the password/codepage each was listed with
    pub fn calls(&self) -> Vec<(PathBuf, Option<String>, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveLister for ScriptedLister {
    async fn list(
        &self,
        path: &Path,
        password: Option<&str>,
        codepage: Option<&str>,
    ) -> std::result::Result<Listing, ListingError> {
        self.calls.lock().unwrap().push((
            path.to_path_buf(),
            password.map(str::to_string),
            codepage.map(str::to_string),
        ));
        tokio::task::yield_now().await;
        let listing = match self.outputs.get(path) {
            Some(Ok(output)) => parse_slt(path, output)?,
            Some(Err(err)) => return Err(err.clone()),
            None => return Err(ListingError::UnsupportedFile(path.to_path_buf())),
        };
        Ok(listing
            .with_password(password.unwrap_or_default())
            .with_codepage(codepage.map(str::to_string)))
    }
}

/// Extractor replaying a script of progress statuses per archive
#[derive(Default)]
pub struct ScriptedExtractor {
    scripts: HashMap<PathBuf, Vec<ProgressStatus>>,
    failures: HashMap<PathBuf, String>,
    requests: Mutex<Vec<ExtractRequest>>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Running`, every entry in `entries`, then `Completed`
    pub fn with_entries(mut self, archive: &str, entries: &[&str]) -> Self {
        let mut script = vec![ProgressStatus::Running];
        script.extend(entries.iter().map(|e| ProgressStatus::Ok(PathBuf::from(e))));
        script.push(ProgressStatus::Completed);
        self.scripts.insert(PathBuf::from(archive), script);
        self
    }

    /// Replay `script` verbatim
    pub fn with_script(mut self, archive: &str, script: Vec<ProgressStatus>) -> Self {
        self.scripts.insert(PathBuf::from(archive), script);
        self
    }

    /// Report `Running`, then fail
    pub fn with_failure(mut self, archive: &str, reason: &str) -> Self {
        self.failures
            .insert(PathBuf::from(archive), reason.to_string());
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ExtractRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        request: &ExtractRequest,
        _target_dir: &Path,
        progress: ProgressSender,
    ) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(reason) = self.failures.get(&request.path) {
            progress.running(&request.path).await;
            return Err(Error::ExtractorFailed {
                archive: request.path.clone(),
                reason: reason.clone(),
            });
        }

        for status in self.scripts.get(&request.path).into_iter().flatten() {
            progress.send((request.path.clone(), status.clone())).await;
            // let other archives interleave
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}
