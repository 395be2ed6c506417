//! locsync core library: record model, store contracts, configuration.
//!
//! - [`types`]: [`Record`], [`Field`], [`FieldDiff`], [`LogicalTable`]
//! - [`store`]: [`SourceProvider`], [`CacheStore`], [`RemoteStore`]
//! - [`error`]: collaborator and config errors
//! - [`config`]: [`Config`]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{CacheError, ConfigError, RecordError, RemoteError, SourceError};
pub use store::{CacheStore, RemoteStore, SourceProvider};
pub use types::{Field, FieldDiff, LogicalTable, Record, RecordId};
