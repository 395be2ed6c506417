//! Error types for locsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use locsync_core::{CacheError, LogicalTable, RemoteError, SourceError};

/// Errors that end a run before any write happens.
///
/// Per-record write failures are not errors at this level; they are
/// collected in [`crate::SyncReport::failures`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The spreadsheet could not be read.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// A cache snapshot could not be read.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// A remote snapshot could not be read.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A snapshot came back empty, which means the fetch failed upstream.
    #[error("{store} table '{table}' wasn't collected, something went wrong")]
    EmptySnapshot {
        store: StoreKind,
        table: LogicalTable,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Marker file JSON error.
    #[error("marker JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which of the three stores an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Source,
    Cache,
    Remote,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Source => write!(f, "source"),
            StoreKind::Cache => write!(f, "cache"),
            StoreKind::Remote => write!(f, "remote"),
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
