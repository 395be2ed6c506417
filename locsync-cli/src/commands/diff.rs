//! `locsync diff`: show field diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use locsync_core::{Config, SourceProvider};
use locsync_stores::SheetSource;
use locsync_sync::{plan, render_record_diff};

use super::Stores;
use crate::TableArg;

/// Arguments for `locsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Limit to one table: static-texts | game-text.
    #[arg(long, value_name = "TABLE")]
    pub table: Option<TableArg>,
}

impl DiffArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let stores = Stores::open(config)?;
        let source = SheetSource::new(config);

        let mut clean = true;
        for entry in stores.tables() {
            if self.table.is_some_and(|t| t.0 != entry.table) {
                continue;
            }
            let records = source
                .fetch_table(entry.table)
                .with_context(|| format!("diff failed for '{}'", entry.table))?;
            let plan = plan(&records, entry.cache);
            if plan.is_empty() {
                continue;
            }
            clean = false;

            println!("# {}", entry.table);
            for record in &plan.new_records {
                println!("new record {}", record.record_id);
            }
            for update in &plan.updates {
                let diff = render_record_diff(update);
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
        }

        if clean {
            println!("No differences between the spreadsheet and the cache.");
        }
        Ok(())
    }
}
