//! # locsync-sync
//!
//! Diff-and-sync engine for localization records.
//!
//! Call [`pipeline::run`] to reconcile every logical table, or
//! [`synchronize`] to reconcile a single table against its stores.

pub mod bootstrap;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod reconcile;

pub use diff::{compute_field_diff, render_record_diff};
pub use error::{StoreKind, SyncError};
pub use pipeline::{RunMode, RunOutcome, TableStores};
pub use reconcile::{
    apply, plan, synchronize, Operation, RecordFailure, RecordUpdate, SyncPlan, SyncReport,
};
