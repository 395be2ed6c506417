//! In-memory fakes of the three store contracts, recording every write.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use locsync_core::{
    error::BoxError, CacheError, CacheStore, FieldDiff, LogicalTable, Record, RecordId,
    RemoteError, RemoteStore, SourceError, SourceProvider,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A record with fixed filler values and the given english text.
pub fn record(id: &str, english: &str) -> Record {
    Record::from_cells([id, "Bob", "Привет", english, "10", "1", ""]).expect("record")
}

fn injected(what: &str) -> BoxError {
    format!("injected {what} failure").into()
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySource {
    pub tables: HashMap<LogicalTable, Vec<Record>>,
    pub fail: Option<LogicalTable>,
}

impl MemorySource {
    pub fn with(mut self, table: LogicalTable, records: Vec<Record>) -> Self {
        self.tables.insert(table, records);
        self
    }
}

impl SourceProvider for MemorySource {
    fn fetch_table(&self, table: LogicalTable) -> Result<Vec<Record>, SourceError> {
        if self.fail == Some(table) {
            return Err(SourceError::Fetch {
                table,
                source: injected("fetch"),
            });
        }
        Ok(self.tables.get(&table).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    InsertMany(Vec<RecordId>),
    UpdatePartial(RecordId, FieldDiff),
}

pub struct MemoryCache {
    table: LogicalTable,
    pub rows: RefCell<Vec<Record>>,
    pub calls: RefCell<Vec<CacheCall>>,
    pub fail_writes: Cell<bool>,
    pub fail_lookup: RefCell<Option<RecordId>>,
}

impl MemoryCache {
    pub fn new(table: LogicalTable, rows: Vec<Record>) -> Self {
        Self {
            table,
            rows: RefCell::new(rows),
            calls: RefCell::new(Vec::new()),
            fail_writes: Cell::new(false),
            fail_lookup: RefCell::new(None),
        }
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn backend_error(&self, what: &str) -> CacheError {
        CacheError::Backend {
            table: self.table,
            source: injected(what),
        }
    }
}

impl CacheStore for MemoryCache {
    fn table(&self) -> LogicalTable {
        self.table
    }

    fn get_all(&self) -> Result<Vec<Record>, CacheError> {
        Ok(self.rows.borrow().clone())
    }

    fn get_by_id(&self, id: &RecordId) -> Result<Option<Record>, CacheError> {
        if self.fail_lookup.borrow().as_ref() == Some(id) {
            return Err(self.backend_error("lookup"));
        }
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|r| &r.record_id == id)
            .cloned())
    }

    fn insert_many(&self, records: &[Record]) -> Result<(), CacheError> {
        self.calls.borrow_mut().push(CacheCall::InsertMany(
            records.iter().map(|r| r.record_id.clone()).collect(),
        ));
        if self.fail_writes.get() {
            return Err(self.backend_error("insert"));
        }
        self.rows.borrow_mut().extend_from_slice(records);
        Ok(())
    }

    fn update_partial(&self, id: &RecordId, fields: &FieldDiff) -> Result<(), CacheError> {
        self.calls
            .borrow_mut()
            .push(CacheCall::UpdatePartial(id.clone(), fields.clone()));
        if self.fail_writes.get() {
            return Err(self.backend_error("update"));
        }
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|r| &r.record_id == id)
            .ok_or_else(|| CacheError::NoMatch {
                table: self.table,
                id: id.clone(),
            })?;
        for (field, value) in fields {
            row.set(*field, value.clone());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Add(Record),
    Update(Record),
}

pub struct MemoryRemote {
    view: String,
    pub rows: RefCell<Vec<Record>>,
    pub calls: RefCell<Vec<RemoteCall>>,
    pub fail_writes: Cell<bool>,
}

impl MemoryRemote {
    pub fn new(view: &str, rows: Vec<Record>) -> Self {
        Self {
            view: view.to_string(),
            rows: RefCell::new(rows),
            calls: RefCell::new(Vec::new()),
            fail_writes: Cell::new(false),
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn rejected(&self) -> RemoteError {
        RemoteError::Rejected {
            view: self.view.clone(),
            status: 500,
            body: "injected".to_string(),
        }
    }
}

impl RemoteStore for MemoryRemote {
    fn view(&self) -> &str {
        &self.view
    }

    fn get_all(&self) -> Result<Vec<Record>, RemoteError> {
        Ok(self.rows.borrow().clone())
    }

    fn add_row(&self, record: &Record) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(RemoteCall::Add(record.clone()));
        if self.fail_writes.get() {
            return Err(self.rejected());
        }
        self.rows.borrow_mut().push(record.clone());
        Ok(())
    }

    fn update_row(&self, record: &Record) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(RemoteCall::Update(record.clone()));
        if self.fail_writes.get() {
            return Err(self.rejected());
        }
        let mut rows = self.rows.borrow_mut();
        match rows.iter_mut().find(|r| r.record_id == record.record_id) {
            Some(row) => *row = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(())
    }
}
