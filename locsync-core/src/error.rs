//! Error types for locsync-core and the collaborator contracts.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{LogicalTable, RecordId};

/// Boxed cause carried by collaborator errors; concrete stores put their
/// transport or database errors here.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors building a [`crate::Record`].
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record id is empty")]
    EmptyId,
}

/// Errors raised by a [`crate::SourceProvider`]. Fatal for the run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A populated row has no value in the record id column.
    #[error("row {row} of '{table}' has no record id; the record id column is required")]
    MissingRecordId { table: LogicalTable, row: usize },

    /// The backing request failed.
    #[error("failed to fetch '{table}' from the spreadsheet: {source}")]
    Fetch {
        table: LogicalTable,
        #[source]
        source: BoxError,
    },

    /// The response could not be parsed into rows.
    #[error("failed to parse '{table}' from the spreadsheet: {source}")]
    Parse {
        table: LogicalTable,
        #[source]
        source: BoxError,
    },
}

/// Errors raised by a [`crate::CacheStore`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// `update_partial` matched no row.
    #[error("record '{id}' not found in cache table '{table}'")]
    NoMatch { table: LogicalTable, id: RecordId },

    /// Database or transaction failure.
    #[error("cache table '{table}' error: {source}")]
    Backend {
        table: LogicalTable,
        #[source]
        source: BoxError,
    },
}

/// Errors raised by a [`crate::RemoteStore`].
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("remote view '{view}' rejected the request: {status} - {body}")]
    Rejected {
        view: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("remote view '{view}' transport error: {source}")]
    Transport {
        view: String,
        #[source]
        source: BoxError,
    },

    /// The response body was not in the expected shape.
    #[error("remote view '{view}' returned an unexpected payload: {source}")]
    Decode {
        view: String,
        #[source]
        source: BoxError,
    },
}

/// Errors loading [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {key}; set it in the environment, .env or the config file")]
    Missing { key: &'static str },

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),
}
