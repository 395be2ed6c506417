//! Subcommands and the store wiring they share.

pub mod diff;
pub mod init;
pub mod status;
pub mod sync;

use anyhow::{Context, Result};

use locsync_core::{CacheStore, Config, LogicalTable};
use locsync_stores::{GridlyClient, SqliteCache};
use locsync_sync::TableStores;

/// Cache and remote store of every logical table, in processing order.
pub struct Stores {
    entries: Vec<(LogicalTable, SqliteCache, GridlyClient)>,
}

impl Stores {
    pub fn open(config: &Config) -> Result<Self> {
        let mut entries = Vec::with_capacity(LogicalTable::ALL.len());
        for table in LogicalTable::ALL {
            let cache = SqliteCache::open(&config.database_path, table).with_context(|| {
                format!(
                    "cannot open cache database '{}'",
                    config.database_path.display()
                )
            })?;
            entries.push((table, cache, GridlyClient::new(config, table)));
        }
        Ok(Self { entries })
    }

    pub fn tables(&self) -> Vec<TableStores<'_>> {
        self.entries
            .iter()
            .map(|(table, cache, remote)| TableStores {
                table: *table,
                cache,
                remote,
            })
            .collect()
    }

    pub fn caches(&self) -> Vec<&dyn CacheStore> {
        self.entries
            .iter()
            .map(|(_, cache, _)| cache as &dyn CacheStore)
            .collect()
    }
}
