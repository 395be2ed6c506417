//! Sync pipeline entrypoint used by the CLI.
//!
//! 1. Fetch the source snapshot of every table (empty = fatal).
//! 2. Fetch the remote snapshot of every table (empty = fatal).
//! 3. Fetch the cache snapshot of every table.
//! 4. If every source snapshot equals its cache snapshot, stop: no changes.
//! 5. Otherwise reconcile each table in turn.
//!
//! Nothing is written before step 5, so a fatal error leaves every store
//! untouched. In step 5 tables are independent: per-record failures in one
//! table are reported and the next table still runs.

use locsync_core::{CacheStore, LogicalTable, Record, RemoteStore, SourceProvider};

use crate::error::{StoreKind, SyncError};
use crate::reconcile::{self, SyncPlan, SyncReport};

/// The cache and remote store of one logical table.
#[derive(Clone, Copy)]
pub struct TableStores<'a> {
    pub table: LogicalTable,
    pub cache: &'a dyn CacheStore,
    pub remote: &'a dyn RemoteStore,
}

/// Whether [`run`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Apply,
    /// Classify only; no store is written.
    DryRun,
}

/// What a run did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every source snapshot equals its cache snapshot.
    NoChanges,
    /// [`RunMode::Apply`]: one report per table, in table order.
    Synced(Vec<SyncReport>),
    /// [`RunMode::DryRun`]: one plan per table, in table order.
    Planned(Vec<SyncPlan>),
}

/// The three snapshots of one logical table.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: LogicalTable,
    pub source: Vec<Record>,
    pub remote: Vec<Record>,
    pub cached: Vec<Record>,
}

impl Snapshot {
    /// Order-sensitive: a reordered sheet counts as changed.
    pub fn source_matches_cache(&self) -> bool {
        self.source == self.cached
    }
}

/// Fetch all snapshots, sources first, then remotes, then caches.
pub fn collect_snapshots(
    source: &dyn SourceProvider,
    tables: &[TableStores<'_>],
) -> Result<Vec<Snapshot>, SyncError> {
    let mut sources = Vec::with_capacity(tables.len());
    for stores in tables {
        let records = source.fetch_table(stores.table)?;
        ensure_not_empty(&records, StoreKind::Source, stores.table)?;
        tracing::debug!("{}: {} source row(s)", stores.table, records.len());
        sources.push(records);
    }

    let mut remotes = Vec::with_capacity(tables.len());
    for stores in tables {
        let records = stores.remote.get_all()?;
        ensure_not_empty(&records, StoreKind::Remote, stores.table)?;
        tracing::debug!(
            "{}: {} row(s) in remote view '{}'",
            stores.table,
            records.len(),
            stores.remote.view()
        );
        remotes.push(records);
    }

    let mut snapshots = Vec::with_capacity(tables.len());
    for ((stores, source), remote) in tables.iter().zip(sources).zip(remotes) {
        let cached = stores.cache.get_all()?;
        if cached.is_empty() {
            tracing::warn!("{}: cache table is empty, seems like it was not filled", stores.table);
        }
        snapshots.push(Snapshot {
            table: stores.table,
            source,
            remote,
            cached,
        });
    }
    Ok(snapshots)
}

/// Run the sync pipeline over `tables`, in order.
pub fn run(
    source: &dyn SourceProvider,
    tables: &[TableStores<'_>],
    mode: RunMode,
) -> Result<RunOutcome, SyncError> {
    let snapshots = collect_snapshots(source, tables)?;

    if snapshots.iter().all(Snapshot::source_matches_cache) {
        tracing::info!("no changes are needed");
        return Ok(RunOutcome::NoChanges);
    }

    let pairs = tables.iter().zip(snapshots);
    match mode {
        RunMode::DryRun => Ok(RunOutcome::Planned(
            pairs
                .map(|(stores, snapshot)| reconcile::plan(&snapshot.source, stores.cache))
                .collect(),
        )),
        RunMode::Apply => Ok(RunOutcome::Synced(
            pairs
                .map(|(stores, snapshot)| {
                    let report =
                        reconcile::synchronize(&snapshot.source, stores.cache, stores.remote);
                    if !report.failures.is_empty() {
                        tracing::warn!(
                            "{}: finished with {} failed record(s)",
                            report.table,
                            report.failures.len()
                        );
                    }
                    report
                })
                .collect(),
        )),
    }
}

fn ensure_not_empty(
    records: &[Record],
    store: StoreKind,
    table: LogicalTable,
) -> Result<(), SyncError> {
    if records.is_empty() {
        return Err(SyncError::EmptySnapshot { store, table });
    }
    Ok(())
}
