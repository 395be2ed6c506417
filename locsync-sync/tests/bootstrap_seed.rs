//! One-time cache seeding guarded by the marker file.

mod common;

use common::{record, CacheCall, MemoryCache, MemorySource};
use locsync_core::{CacheStore, LogicalTable, RecordId};
use locsync_sync::{
    bootstrap::{bootstrap, load_marker, BootstrapOutcome},
    SyncError,
};
use tempfile::TempDir;

fn source() -> MemorySource {
    MemorySource::default()
        .with(
            LogicalTable::StaticTexts,
            vec![record("S1", "Play"), record("S2", "Quit")],
        )
        .with(LogicalTable::GameText, vec![record("G1", "Hello")])
}

#[test]
fn seeds_empty_caches_and_writes_marker() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("module_run.flag");
    let static_cache = MemoryCache::new(LogicalTable::StaticTexts, vec![]);
    let game_cache = MemoryCache::new(LogicalTable::GameText, vec![]);
    let caches: [&dyn CacheStore; 2] = [&static_cache, &game_cache];

    let outcome = bootstrap(&marker, &source(), &caches).expect("bootstrap");

    let BootstrapOutcome::Seeded(written) = outcome else {
        panic!("expected Seeded");
    };
    assert_eq!(written.tables.get("static_texts"), Some(&2));
    assert_eq!(written.tables.get("game_text"), Some(&1));
    assert_eq!(load_marker(&marker).unwrap(), Some(written));
    assert_eq!(
        static_cache.calls(),
        vec![CacheCall::InsertMany(vec![RecordId::from("S1"), RecordId::from("S2")])]
    );
}

#[test]
fn existing_marker_makes_bootstrap_a_noop() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("module_run.flag");
    std::fs::write(&marker, "{}").unwrap();
    let static_cache = MemoryCache::new(LogicalTable::StaticTexts, vec![]);
    let caches: [&dyn CacheStore; 1] = [&static_cache];

    let outcome = bootstrap(&marker, &source(), &caches).expect("bootstrap");

    assert!(matches!(outcome, BootstrapOutcome::AlreadyInitialized { .. }));
    assert!(static_cache.calls().is_empty());
}

#[test]
fn populated_cache_is_not_seeded_twice() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("module_run.flag");
    let static_cache = MemoryCache::new(LogicalTable::StaticTexts, vec![record("S1", "Play")]);
    let caches: [&dyn CacheStore; 1] = [&static_cache];

    let outcome = bootstrap(&marker, &source(), &caches).expect("bootstrap");

    let BootstrapOutcome::Seeded(written) = outcome else {
        panic!("expected Seeded");
    };
    assert_eq!(written.tables.get("static_texts"), Some(&0));
    assert!(static_cache.calls().is_empty());
}

#[test]
fn empty_source_table_aborts_before_any_insert() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("module_run.flag");
    let src = MemorySource::default().with(LogicalTable::StaticTexts, vec![record("S1", "Play")]);
    let static_cache = MemoryCache::new(LogicalTable::StaticTexts, vec![]);
    let game_cache = MemoryCache::new(LogicalTable::GameText, vec![]);
    let caches: [&dyn CacheStore; 2] = [&static_cache, &game_cache];

    let err = bootstrap(&marker, &src, &caches).unwrap_err();

    assert!(matches!(err, SyncError::EmptySnapshot { .. }));
    assert!(static_cache.calls().is_empty());
    assert!(!marker.exists(), "marker is written only after seeding");
}
