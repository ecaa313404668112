//! CLI command handlers for the bucket file itself
//!
//! init, status, sync, snapshot and config.

use std::path::Path;

use crate::config::settings::Settings;
use crate::display::{format_balance_change, format_balances, format_rules};
use crate::error::LedgerResult;
use crate::services::{SnapshotService, SyncService};
use crate::storage::{initialize_storage, Storage};

/// Handle the init command
pub fn handle_init_command(storage: &Storage, settings: &Settings, force: bool) -> LedgerResult<()> {
    println!("Initializing bucket-ledger at: {}", storage.paths().base_dir().display());
    let book = initialize_storage(storage, settings, force)?;

    println!("Initialization complete!");
    println!();
    println!("Buckets: Savings, Needs, Wants, Total (all at zero)");
    println!("Rules:");
    print!("{}", format_rules(&book.rule_set()));
    println!();
    println!("Edit {} to add patterns,", storage.buckets.path().display());
    println!(
        "then drop bank exports into {} and run 'buckets ingest'.",
        settings.resolve_input_dir(storage.paths()).display()
    );
    Ok(())
}

/// Handle the status command
pub fn handle_status_command(storage: &Storage, settings: &Settings) -> LedgerResult<()> {
    let book = storage.buckets.load()?;

    println!("{}", format_balances(&book.balances(), &settings.currency_symbol));
    println!();
    println!("Rules (in evaluation order):");
    print!("{}", format_rules(&book.rule_set()));

    let processed = storage.history.len()?;
    println!();
    println!("Processed transactions: {}", processed);
    Ok(())
}

/// Handle the sync command
pub fn handle_sync_command(storage: &Storage, settings: &Settings, source: &Path) -> LedgerResult<()> {
    let change = SyncService::new(storage).sync_from(source)?;

    println!("Synced buckets from {}", source.display());
    println!(
        "{}",
        format_balance_change(&change.before, &change.after, &settings.currency_symbol)
    );
    Ok(())
}

/// Handle the snapshot command
pub fn handle_snapshot_command(storage: &Storage, settings: &Settings, list: bool) -> LedgerResult<()> {
    let service = SnapshotService::new(storage);

    if list {
        let snapshots = service.list()?;
        if snapshots.is_empty() {
            println!("No snapshots recorded yet. Run 'buckets snapshot' to record one.");
            return Ok(());
        }
        for snapshot in snapshots {
            println!(
                "{}  {:>12}",
                snapshot.timestamp.format("%Y-%m-%d %H:%M"),
                snapshot.total.format_with_symbol(&settings.currency_symbol)
            );
        }
        return Ok(());
    }

    let snapshot = service.record()?;
    println!(
        "Recorded Total {} at {}",
        snapshot.total.format_with_symbol(&settings.currency_symbol),
        snapshot.timestamp.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

/// Handle the config command
pub fn handle_config_command(storage: &Storage, settings: &Settings) -> LedgerResult<()> {
    let paths = storage.paths();

    println!("bucket-ledger Configuration");
    println!("===========================");
    println!("Data directory:   {}", paths.base_dir().display());
    println!("Bucket file:      {}", paths.buckets_file().display());
    println!("History ledger:   {}", paths.history_file().display());
    println!("Input directory:  {}", settings.resolve_input_dir(paths).display());
    println!("Backup directory: {}", paths.backup_dir().display());
    println!();
    println!("Settings:");
    println!("  Date format:      {}", settings.date_format);
    println!("  Currency symbol:  {}", settings.currency_symbol);
    println!("  Keep inputs:      {}", settings.keep_inputs);
    println!(
        "  Backup retention: {} daily, {} monthly",
        settings.backup_retention.daily_count, settings.backup_retention.monthly_count
    );
    Ok(())
}
