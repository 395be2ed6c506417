//! `locsync init`: create the cache database and seed it from the spreadsheet.

use anyhow::{Context, Result};
use clap::Args;

use locsync_core::Config;
use locsync_stores::SheetSource;
use locsync_sync::bootstrap::{bootstrap, BootstrapOutcome};

use super::Stores;

/// Seed every empty cache table once; later runs are no-ops.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let stores = Stores::open(config)?;
        let source = SheetSource::new(config);

        let outcome = bootstrap(&config.marker_path, &source, &stores.caches())
            .context("failed to initialize the cache database")?;

        match outcome {
            BootstrapOutcome::AlreadyInitialized { marker } => {
                println!("Database with tables already exists and not needed to be created again.");
                println!("  Marker: {}", marker.display());
            }
            BootstrapOutcome::Seeded(marker) => {
                println!(
                    "✓ Database '{}' created",
                    config.database_path.display()
                );
                for (table, rows) in &marker.tables {
                    println!("  {table}: {rows} row(s) inserted");
                }
                println!("  Marker: {}", config.marker_path.display());
            }
        }
        Ok(())
    }
}
