//! `locsync status`: row counts and pending work per logical table.

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use locsync_core::{Config, Record, RecordId};
use locsync_stores::SheetSource;
use locsync_sync::{
    bootstrap,
    pipeline::{self, Snapshot},
    plan,
};

use super::Stores;

/// Arguments for `locsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let stores = Stores::open(config)?;
        let source = SheetSource::new(config);
        let tables = stores.tables();

        let snapshots =
            pipeline::collect_snapshots(&source, &tables).context("status check failed")?;
        let rows: Vec<TableStatus> = tables
            .iter()
            .zip(&snapshots)
            .map(|(entry, snapshot)| {
                let pending = plan(&snapshot.source, entry.cache);
                TableStatus::new(snapshot, pending.new_records.len(), pending.updates.len())
            })
            .collect();

        let initialized_at = bootstrap::load_marker(&config.marker_path)
            .with_context(|| format!("failed to read marker '{}'", config.marker_path.display()))?
            .map(|marker| marker.initialized_at.to_rfc3339());

        if self.json {
            let payload = StatusReportJson {
                initialized_at,
                tables: rows,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(initialized_at, rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct TableStatus {
    table: String,
    in_sync: bool,
    source_rows: usize,
    cache_rows: usize,
    remote_rows: usize,
    pending_new: usize,
    pending_updates: usize,
    missing_in_remote: usize,
}

impl TableStatus {
    fn new(snapshot: &Snapshot, pending_new: usize, pending_updates: usize) -> Self {
        Self {
            table: snapshot.table.to_string(),
            in_sync: snapshot.source_matches_cache(),
            source_rows: snapshot.source.len(),
            cache_rows: snapshot.cached.len(),
            remote_rows: snapshot.remote.len(),
            pending_new,
            pending_updates,
            missing_in_remote: missing_in_remote(&snapshot.cached, &snapshot.remote),
        }
    }
}

/// Cached records whose id is not in the remote snapshot.
fn missing_in_remote(cached: &[Record], remote: &[Record]) -> usize {
    let remote_ids: HashSet<&RecordId> = remote.iter().map(|r| &r.record_id).collect();
    cached
        .iter()
        .filter(|r| !remote_ids.contains(&r.record_id))
        .count()
}

#[derive(Serialize)]
struct StatusReportJson {
    initialized_at: Option<String>,
    tables: Vec<TableStatus>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "table")]
    table: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "sheet")]
    source_rows: usize,
    #[tabled(rename = "cache")]
    cache_rows: usize,
    #[tabled(rename = "gridly")]
    remote_rows: usize,
    #[tabled(rename = "new")]
    pending_new: usize,
    #[tabled(rename = "updated")]
    pending_updates: usize,
    #[tabled(rename = "missing in gridly")]
    missing_in_remote: usize,
}

fn print_table(initialized_at: Option<String>, rows: Vec<TableStatus>) {
    match initialized_at {
        Some(at) => println!("locsync v{} | cache initialized {at}", env!("CARGO_PKG_VERSION")),
        None => println!(
            "locsync v{} | cache not initialized, run `locsync init`",
            env!("CARGO_PKG_VERSION")
        ),
    }

    let needs_sync = rows.iter().any(|r| !r.in_sync);
    let drift = rows.iter().any(|r| r.missing_in_remote > 0);
    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|row| StatusTableRow {
            status: status_label(&row),
            table: row.table,
            source_rows: row.source_rows,
            cache_rows: row.cache_rows,
            remote_rows: row.remote_rows,
            pending_new: row.pending_new,
            pending_updates: row.pending_updates,
            missing_in_remote: row.missing_in_remote,
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if needs_sync {
        println!("Run 'locsync sync' to propagate pending changes.");
    }
    if drift {
        println!(
            "{} some cached records are missing from Gridly; sync does not re-add them.",
            "!".yellow().bold()
        );
    }
}

fn status_label(row: &TableStatus) -> String {
    if row.in_sync {
        format!("{} CURRENT", "■".green().bold())
    } else if row.pending_new == 0 && row.pending_updates == 0 {
        format!("{} REORDERED", "■".bright_black().bold())
    } else {
        format!("{} PENDING", "■".yellow().bold())
    }
}
