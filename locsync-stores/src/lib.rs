//! # locsync-stores
//!
//! Concrete implementations of the store contracts in `locsync-core`:
//!
//! - [`SheetSource`]: spreadsheet tabs fetched as CSV
//! - [`SqliteCache`]: local SQLite cache, one table per logical table
//! - [`GridlyClient`]: remote Gridly view over HTTP/JSON

pub mod gridly;
mod http;
pub mod sheet;
pub mod sqlite;

pub use gridly::GridlyClient;
pub use sheet::SheetSource;
pub use sqlite::SqliteCache;
