//! `locsync sync`: reconcile every logical table.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use locsync_core::Config;
use locsync_stores::SheetSource;
use locsync_sync::{
    pipeline::{self, RunMode, RunOutcome},
    RecordFailure, SyncPlan, SyncReport,
};

use super::Stores;

/// Arguments for `locsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be written without touching the cache or Gridly.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let stores = Stores::open(config)?;
        let source = SheetSource::new(config);
        let mode = if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        };

        let outcome = pipeline::run(&source, &stores.tables(), mode).context("sync failed")?;
        match outcome {
            RunOutcome::NoChanges => println!("No changes are needed to add to Gridly."),
            RunOutcome::Planned(plans) => {
                for plan in &plans {
                    print_plan(plan);
                }
            }
            RunOutcome::Synced(reports) => {
                for report in &reports {
                    print_report(report);
                }
                let failed: usize = reports.iter().map(|r| r.failures.len()).sum();
                if failed == 0 {
                    println!("Tables were successfully synchronised.");
                } else {
                    println!(
                        "Tables were synchronised with {failed} failed record(s); rerun sync to retry them."
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_plan(plan: &SyncPlan) {
    let table = plan.table;
    if plan.is_empty() && plan.failures.is_empty() {
        println!("[dry-run] ✓ '{table}' — nothing to do");
        return;
    }

    println!(
        "[dry-run] ✓ '{table}' would sync ({} new, {} updated, {} unchanged)",
        plan.new_records.len(),
        plan.updates.len(),
        plan.unchanged
    );
    for record in &plan.new_records {
        println!("  +  {}", record.record_id);
    }
    for update in &plan.updates {
        println!("  ~  {} ({})", update.source.record_id, field_names(update.diff.keys()));
    }
    print_failures(&plan.failures);
}

fn print_report(report: &SyncReport) {
    let table = report.table;
    if !report.has_changes() {
        println!("✓ '{table}' — nothing to do");
        return;
    }

    println!(
        "✓ '{table}' synced ({} added, {} updated, {} unchanged, {} failed)",
        report.added.len(),
        report.updated.len(),
        report.unchanged,
        report.failures.len()
    );
    for id in &report.added {
        println!("  +  {id}");
    }
    for (id, diff) in &report.updated {
        println!("  ✎  {id} ({})", field_names(diff.keys()));
    }
    print_failures(&report.failures);
}

fn print_failures(failures: &[RecordFailure]) {
    for failure in failures {
        println!(
            "  {}  {} {} {}: {}",
            "✗".red().bold(),
            failure.record_id,
            failure.store,
            failure.operation,
            failure.cause
        );
    }
}

fn field_names<'a>(fields: impl Iterator<Item = &'a locsync_core::Field>) -> String {
    fields.map(|f| f.name()).collect::<Vec<_>>().join(", ")
}
