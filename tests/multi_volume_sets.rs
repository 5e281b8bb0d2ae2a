//! Volume sets dropped as several files end up as one tracked archive.

mod common;

use common::{
    SPLIT_7Z_SECOND_SLT, SPLIT_7Z_SLT, ScriptedExtractor, ScriptedLister, assert_archive,
    drain_events,
};
use std::path::{Path, PathBuf};
use unzip_progress::{
    ArchiveStatus, CompletedArchive, Config, Event, RemovalReason, UnzipTracker,
};

fn volumes() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/data/movie.7z.001"),
        PathBuf::from("/data/movie.7z.002"),
    ]
}

#[tokio::test]
async fn dropping_every_volume_tracks_one_archive() {
    let mut tracker = UnzipTracker::new(Config::default()).unwrap();
    let mut events = tracker.subscribe();
    let lister = ScriptedLister::new()
        .with_output("/data/movie.7z.001", SPLIT_7Z_SLT)
        .with_output("/data/movie.7z.002", SPLIT_7Z_SECOND_SLT);

    tracker
        .load_listings(&lister, ["/data/movie.7z.001", "/data/movie.7z.002"])
        .await;

    assert_eq!(tracker.registry().len(), 1);
    let record = tracker.registry().records().next().unwrap();
    assert_eq!(record.path(), Path::new("/data/movie.7z.001"));
    assert_eq!(record.multi_volume().unwrap().volumes, volumes());

    let events = drain_events(&mut events);
    let merged: Vec<(PathBuf, PathBuf)> = events
        .iter()
        .filter_map(|e| match e {
            Event::Merged { from, into } => Some((from.clone(), into.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        merged,
        vec![(
            PathBuf::from("/data/movie.7z.002"),
            PathBuf::from("/data/movie.7z.001")
        )]
    );

    let removed: Vec<(PathBuf, RemovalReason)> = events
        .into_iter()
        .filter_map(|e| match e {
            Event::Removed { path, reason, .. } => Some((path, reason)),
            _ => None,
        })
        .collect();
    assert_eq!(
        removed,
        vec![(
            PathBuf::from("/data/movie.7z.002"),
            RemovalReason::MergedIntoVolumeSet(PathBuf::from("/data/movie.7z.001"))
        )]
    );
}

#[tokio::test]
async fn second_volume_alone_moves_to_the_first() {
    let mut tracker = UnzipTracker::new(Config::default()).unwrap();
    let lister = ScriptedLister::new().with_output("/data/movie.7z.002", SPLIT_7Z_SECOND_SLT);
    tracker.load_listings(&lister, ["/data/movie.7z.002"]).await;

    assert_archive(&tracker, "/data/movie.7z.001", ArchiveStatus::Listed, (0, 1), (0, 1));
    // the dropped path still finds the record
    assert_eq!(
        tracker
            .registry()
            .get(Path::new("/data/movie.7z.002"))
            .unwrap()
            .path(),
        Path::new("/data/movie.7z.001")
    );
    // dropping it again does not add a second record
    tracker.add_paths(["/data/movie.7z.002"]);
    assert_eq!(tracker.registry().len(), 1);
}

#[tokio::test]
async fn completed_volume_set_is_reported_and_purged_as_a_whole() {
    let mut tracker = UnzipTracker::new(Config::default()).unwrap();
    let lister = ScriptedLister::new()
        .with_output("/data/movie.7z.001", SPLIT_7Z_SLT)
        .with_output("/data/movie.7z.002", SPLIT_7Z_SECOND_SLT);
    tracker
        .load_listings(&lister, ["/data/movie.7z.001", "/data/movie.7z.002"])
        .await;

    let extractor = ScriptedExtractor::new()
        .with_entries("/data/movie.7z.001", &["movie", "movie/movie.mkv"]);
    let report = tracker.unzip_all(&extractor, Path::new("/out")).await;

    let expected = CompletedArchive::Volumes(volumes());
    assert_eq!(report.completed, vec![expected.clone()]);
    assert_eq!(tracker.registry().recently_completed(), Some(&expected));
    assert_eq!(extractor.requests().len(), 1);

    tracker.remove(Path::new("/data/movie.7z.002")).unwrap();
    assert!(tracker.registry().is_empty());
    assert!(tracker.registry().completed().is_empty());
    assert!(tracker.registry().recently_completed().is_none());
}
