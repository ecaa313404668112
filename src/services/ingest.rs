//! Ingest service
//!
//! Orchestrates one ingestion run: discover the exports, plan the batch in
//! memory, then commit it once (backup, bucket save, ledger append, audit)
//! and archive the processed files.

use std::fs;
use std::path::PathBuf;

use crate::audit::{AuditEntry, Operation};
use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

use super::categorize::{plan_batch, IngestPlan};
use super::source::TransactionSource;

/// Options for a single run
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Directory to scan; the configured input directory when `None`
    pub dir: Option<PathBuf>,
    /// Plan and report without writing anything
    pub dry_run: bool,
    /// Leave the exports in place after archiving them
    pub keep_inputs: bool,
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub files: Vec<PathBuf>,
    pub plan: IngestPlan,
    pub dry_run: bool,
    /// Copies of the exports under `backups/inputs`
    pub archived: Vec<PathBuf>,
    /// Whether the original exports were deleted
    pub inputs_removed: bool,
}

/// Service for ingesting bank exports
pub struct IngestService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> IngestService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Run an ingestion
    pub fn run(&self, options: &IngestOptions) -> LedgerResult<IngestReport> {
        let _lock = self.storage.lock()?;

        let dir = options
            .dir
            .clone()
            .unwrap_or_else(|| self.settings.resolve_input_dir(self.storage.paths()));
        let files = TransactionSource::discover(&dir)?;
        log::info!("found {} export(s) in {}", files.len(), dir.display());

        let rows = TransactionSource::new(self.settings.date_format.clone()).load_files(&files)?;

        let mut book = self.storage.buckets.load()?;
        let rules = book.rule_set();
        let seen = self.storage.history.seen()?;

        let plan = plan_batch(&rules, book.balances(), seen, rows)?;
        // The ledger must accept the batch before any balance is written
        self.storage.history.check_append(&plan.entries)?;

        if options.dry_run {
            return Ok(IngestReport {
                files,
                plan,
                dry_run: true,
                archived: Vec::new(),
                inputs_removed: false,
            });
        }

        if plan.has_changes() {
            self.storage.backup_before("ingest")?;
            book.set_balances(&plan.after);
            self.storage.buckets.save(&book)?;
            self.storage.history.append(&plan.entries)?;
            self.storage.log_audit(&AuditEntry::balance_change(
                Operation::Ingest,
                format!(
                    "{} new transaction(s), {} duplicate(s) from {}",
                    plan.entries.len(),
                    plan.duplicates,
                    file_names(&files)
                ),
                plan.before,
                plan.after,
            ))?;
        } else {
            log::info!("nothing new to apply");
        }

        let archived = self.storage.backups.archive_inputs(&files)?;
        let keep = options.keep_inputs || self.settings.keep_inputs;
        if !keep {
            for file in &files {
                fs::remove_file(file).map_err(|e| {
                    LedgerError::Io(format!("Failed to remove {}: {}", file.display(), e))
                })?;
            }
        }

        Ok(IngestReport {
            files,
            plan,
            dry_run: false,
            archived,
            inputs_removed: !keep,
        })
    }
}

fn file_names(files: &[PathBuf]) -> String {
    files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
