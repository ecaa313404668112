//! CLI command handler for ingesting bank exports

use std::path::PathBuf;

use crate::config::settings::Settings;
use crate::display::format_ingest_report;
use crate::error::LedgerResult;
use crate::services::{IngestOptions, IngestService};
use crate::storage::Storage;

/// Handle the ingest command
pub fn handle_ingest_command(
    storage: &Storage,
    settings: &Settings,
    dir: Option<PathBuf>,
    dry_run: bool,
    keep_inputs: bool,
) -> LedgerResult<()> {
    let options = IngestOptions {
        dir,
        dry_run,
        keep_inputs,
    };
    let report = IngestService::new(storage, settings).run(&options)?;

    let names: Vec<String> = report
        .files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();
    println!("Ingesting: {}", names.join(", "));
    println!();
    print!("{}", format_ingest_report(&report, &settings.currency_symbol));

    Ok(())
}
