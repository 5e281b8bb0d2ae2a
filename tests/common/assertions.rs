//! Event collection helpers and custom assertions

use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use unzip_progress::{ArchiveStatus, Event, UnzipTracker};

/// Drain every event currently buffered in `events`
pub fn drain_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

/// Serialized `type` tag of each event, for compact ordering assertions
pub fn event_kinds(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|e| {
            serde_json::to_value(e).unwrap()["type"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect()
}

/// Wait for an event matching `predicate`
pub async fn wait_for_event<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    predicate: F,
) -> Option<Event>
where
    F: Fn(&Event) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    })
    .await;

    result.ok().flatten()
}

/// Assert the status and counters of the archive tracked at `path`
pub fn assert_archive(
    tracker: &UnzipTracker,
    path: &str,
    status: ArchiveStatus,
    directories: (u64, u64),
    files: (u64, u64),
) {
    let record = tracker
        .registry()
        .get(Path::new(path))
        .unwrap_or_else(|| panic!("{path} is not tracked"));
    let counter = record.counter();
    assert_eq!(record.status(), status, "status of {path}");
    assert_eq!(
        (counter.directory.done, counter.directory.total),
        directories,
        "directory counter of {path}"
    );
    assert_eq!(
        (counter.file.done, counter.file.total),
        files,
        "file counter of {path}"
    );
}
