//! Reconciler: brings one cache table and its remote view in line with a
//! source snapshot.
//!
//! ## Classification
//!
//! For each source record, `cache.get_by_id`:
//! - `None` → NEW, inserted in one batch after the loop, then added to the
//!   remote one row at a time.
//! - equal (all seven fields) → unchanged, no writes.
//! - different → UPDATED: `update_partial` with the field diff, `update_row`
//!   with the full source record.
//!
//! Write failures are recorded per record and never stop the loop.

use std::collections::HashSet;
use std::fmt;

use locsync_core::{CacheStore, FieldDiff, LogicalTable, Record, RecordId, RemoteStore};

use crate::diff::compute_field_diff;
use crate::error::StoreKind;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A record present in the cache whose fields differ from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub source: Record,
    pub cached: Record,
    pub diff: FieldDiff,
}

/// Read-only outcome of classifying a source snapshot against the cache.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub table: LogicalTable,
    pub new_records: Vec<Record>,
    pub updates: Vec<RecordUpdate>,
    pub unchanged: usize,
    /// Lookups that errored; these records are neither inserted nor updated.
    pub failures: Vec<RecordFailure>,
}

impl SyncPlan {
    fn new(table: LogicalTable) -> Self {
        Self {
            table,
            new_records: Vec::new(),
            updates: Vec::new(),
            unchanged: 0,
            failures: Vec::new(),
        }
    }

    /// `true` when applying the plan would issue no writes.
    pub fn is_empty(&self) -> bool {
        self.new_records.is_empty() && self.updates.is_empty()
    }
}

/// Classify every record of `source` against `cache`. Issues no writes.
///
/// Every lookup sees the cache as it was before the run, so an id repeated
/// in `source` is classified twice against the same cached row.
pub fn plan(source: &[Record], cache: &dyn CacheStore) -> SyncPlan {
    let table = cache.table();
    let mut plan = SyncPlan::new(table);
    let mut seen = HashSet::with_capacity(source.len());

    for record in source {
        let id = &record.record_id;
        if !seen.insert(id) {
            tracing::debug!("{table}: '{id}' appears more than once in the source");
        }
        match cache.get_by_id(id) {
            Ok(None) => {
                tracing::debug!("{table}: '{id}' not cached, queued as new");
                plan.new_records.push(record.clone());
            }
            Ok(Some(cached)) if cached == *record => plan.unchanged += 1,
            Ok(Some(cached)) => {
                let diff = compute_field_diff(record, &cached);
                plan.updates.push(RecordUpdate {
                    source: record.clone(),
                    cached,
                    diff,
                });
            }
            Err(err) => {
                let failure = RecordFailure::new(id, StoreKind::Cache, Operation::Lookup, &err);
                failure.log(table);
                plan.failures.push(failure);
            }
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The write (or lookup) that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Insert,
    Update,
    Add,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Lookup => write!(f, "lookup"),
            Operation::Insert => write!(f, "insert"),
            Operation::Update => write!(f, "update"),
            Operation::Add => write!(f, "add"),
        }
    }
}

/// A per-record failure. Recoverable; the next run retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub record_id: RecordId,
    pub store: StoreKind,
    pub operation: Operation,
    pub cause: String,
}

impl RecordFailure {
    fn new(id: &RecordId, store: StoreKind, operation: Operation, cause: &dyn fmt::Display) -> Self {
        Self {
            record_id: id.clone(),
            store,
            operation,
            cause: cause.to_string(),
        }
    }

    fn log(&self, table: LogicalTable) {
        tracing::warn!(
            "{table}: {} of record '{}' failed in {}: {}",
            self.operation,
            self.record_id,
            self.store,
            self.cause
        );
    }
}

/// Outcome of [`apply`] / [`synchronize`] for one logical table.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub table: LogicalTable,
    /// Inserted into the cache and added to the remote.
    pub added: Vec<RecordId>,
    /// Updated in both the cache and the remote.
    pub updated: Vec<(RecordId, FieldDiff)>,
    pub unchanged: usize,
    pub failures: Vec<RecordFailure>,
}

impl SyncReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.failures.is_empty()
    }

    fn fail(&mut self, id: &RecordId, store: StoreKind, operation: Operation, cause: &dyn fmt::Display) {
        let failure = RecordFailure::new(id, store, operation, cause);
        failure.log(self.table);
        self.failures.push(failure);
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Issue the writes described by `plan`.
///
/// Updates go first, in source order. The NEW batch is then inserted into
/// the cache with one call; only if that succeeds is each record added to
/// the remote, so a failed batch is retried whole on the next run.
pub fn apply(plan: SyncPlan, cache: &dyn CacheStore, remote: &dyn RemoteStore) -> SyncReport {
    let table = plan.table;
    let mut report = SyncReport {
        table,
        added: Vec::new(),
        updated: Vec::new(),
        unchanged: plan.unchanged,
        failures: plan.failures,
    };

    for update in plan.updates {
        let id = &update.source.record_id;
        let mut ok = true;

        if let Err(err) = cache.update_partial(id, &update.diff) {
            ok = false;
            report.fail(id, StoreKind::Cache, Operation::Update, &err);
        }
        if let Err(err) = remote.update_row(&update.source) {
            ok = false;
            report.fail(id, StoreKind::Remote, Operation::Update, &err);
        }

        if ok {
            tracing::info!("{table}: record '{id}' updated ({})", field_list(&update.diff));
            report.updated.push((id.clone(), update.diff));
        }
    }

    if plan.new_records.is_empty() {
        return report;
    }

    if let Err(err) = cache.insert_many(&plan.new_records) {
        for record in &plan.new_records {
            report.fail(&record.record_id, StoreKind::Cache, Operation::Insert, &err);
        }
        return report;
    }
    tracing::info!(
        "{table}: {} new record(s) inserted into cache",
        plan.new_records.len()
    );

    for record in &plan.new_records {
        match remote.add_row(record) {
            Ok(()) => report.added.push(record.record_id.clone()),
            Err(err) => report.fail(&record.record_id, StoreKind::Remote, Operation::Add, &err),
        }
    }
    tracing::info!(
        "{table}: {} new record(s) added to remote view '{}'",
        report.added.len(),
        remote.view()
    );

    report
}

/// Plan and apply in one step.
pub fn synchronize(
    source: &[Record],
    cache: &dyn CacheStore,
    remote: &dyn RemoteStore,
) -> SyncReport {
    apply(plan(source, cache), cache, remote)
}

fn field_list(diff: &FieldDiff) -> String {
    diff.keys()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}
