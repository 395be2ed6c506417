//! One-time cache bootstrap.
//!
//! Seeds every empty cache table from the spreadsheet and then persists an
//! "already initialized" marker as JSON. Once the marker exists the routine
//! is a no-op. Writes use the `.tmp` + rename pattern.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use locsync_core::{CacheStore, SourceProvider};

use crate::error::{io_err, StoreKind, SyncError};

/// On-disk marker payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitMarker {
    pub initialized_at: DateTime<Utc>,
    /// Rows inserted per cache table.
    pub tables: BTreeMap<String, usize>,
}

/// Outcome of [`bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyInitialized { marker: PathBuf },
    Seeded(InitMarker),
}

/// Seed the caches unless `marker_path` exists.
///
/// All source tables are fetched before the first insert. A cache table that
/// already holds rows is left alone.
pub fn bootstrap(
    marker_path: &Path,
    source: &dyn SourceProvider,
    caches: &[&dyn CacheStore],
) -> Result<BootstrapOutcome, SyncError> {
    if marker_path.exists() {
        tracing::info!(
            "marker {} present, database already initialized",
            marker_path.display()
        );
        return Ok(BootstrapOutcome::AlreadyInitialized {
            marker: marker_path.to_path_buf(),
        });
    }

    let mut snapshots = Vec::with_capacity(caches.len());
    for cache in caches {
        let records = source.fetch_table(cache.table())?;
        if records.is_empty() {
            return Err(SyncError::EmptySnapshot {
                store: StoreKind::Source,
                table: cache.table(),
            });
        }
        snapshots.push(records);
    }

    let mut tables = BTreeMap::new();
    for (cache, records) in caches.iter().zip(snapshots) {
        let table = cache.table();
        let existing = cache.get_all()?.len();
        let inserted = if existing > 0 {
            tracing::warn!("{table}: cache already holds {existing} row(s), not seeding");
            0
        } else {
            cache.insert_many(&records)?;
            tracing::info!("{table}: seeded {} row(s)", records.len());
            records.len()
        };
        tables.insert(table.cache_table().to_string(), inserted);
    }

    let marker = InitMarker {
        initialized_at: Utc::now(),
        tables,
    };
    save_marker(marker_path, &marker)?;
    Ok(BootstrapOutcome::Seeded(marker))
}

/// Read the marker, `None` if it does not exist.
pub fn load_marker(path: &Path) -> Result<Option<InitMarker>, SyncError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write the marker atomically.
pub fn save_marker(path: &Path, marker: &InitMarker) -> Result<(), SyncError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }

    let json = serde_json::to_string_pretty(marker)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
