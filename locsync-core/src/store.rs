//! Capability contracts for the three stores a sync run touches.
//!
//! Implementations live in `locsync-stores`; tests use in-memory fakes.
//! All calls are blocking and executed one at a time.

use crate::error::{CacheError, RemoteError, SourceError};
use crate::types::{FieldDiff, LogicalTable, Record, RecordId};

/// The authoritative spreadsheet.
pub trait SourceProvider {
    /// Rows of `table` in sheet order, blank rows skipped.
    fn fetch_table(&self, table: LogicalTable) -> Result<Vec<Record>, SourceError>;
}

/// Local keyed cache, scoped to one logical table.
pub trait CacheStore {
    fn table(&self) -> LogicalTable;

    fn get_all(&self) -> Result<Vec<Record>, CacheError>;

    /// `Ok(None)` when no record has this id.
    fn get_by_id(&self, id: &RecordId) -> Result<Option<Record>, CacheError>;

    /// All-or-nothing batch insert.
    fn insert_many(&self, records: &[Record]) -> Result<(), CacheError>;

    /// Overwrite only the given fields of the record with `id`.
    ///
    /// Fails with [`CacheError::NoMatch`] when the id is absent; on any
    /// failure the stored record is left unchanged.
    fn update_partial(&self, id: &RecordId, fields: &FieldDiff) -> Result<(), CacheError>;
}

/// Remote content-management table, scoped to one view.
pub trait RemoteStore {
    /// Identifier used in logs and error messages.
    fn view(&self) -> &str;

    fn get_all(&self) -> Result<Vec<Record>, RemoteError>;

    fn add_row(&self, record: &Record) -> Result<(), RemoteError>;

    /// Replace the row with `record.record_id` by the full record.
    fn update_row(&self, record: &Record) -> Result<(), RemoteError>;
}
