//! Storage layer for bucket-ledger
//!
//! Provides the bucket store (JSON with atomic writes), the append-only CSV
//! ledgers, the single-writer lock and automatic directory creation.

pub mod activity;
pub mod buckets;
pub mod csv_log;
pub mod file_io;
pub mod history;
pub mod init;
pub mod lock;

pub use activity::{
    now_timestamp, ActivityLog, LogRecord, SyncRecord, TotalSnapshot, TransferRecord,
    WithdrawRecord,
};
pub use buckets::{BucketBook, BucketStore};
pub use csv_log::{read_table, CsvLog, CsvTable};
pub use file_io::{read_json_required, write_json_atomic};
pub use history::{HistoryLedger, SeenTransactions};
pub use init::initialize_storage;
pub use lock::LedgerLock;

use crate::audit::{AuditEntry, AuditLogger};
use crate::backup::BackupManager;
use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::LedgerResult;

/// Main storage coordinator that provides access to every file
pub struct Storage {
    paths: LedgerPaths,
    pub buckets: BucketStore,
    pub history: HistoryLedger,
    pub transfers: ActivityLog<TransferRecord>,
    pub withdrawals: ActivityLog<WithdrawRecord>,
    pub syncs: ActivityLog<SyncRecord>,
    pub totals: ActivityLog<TotalSnapshot>,
    pub audit: AuditLogger,
    pub backups: BackupManager,
}

impl Storage {
    /// Create a new Storage instance, creating the directory layout
    pub fn new(paths: LedgerPaths, settings: &Settings) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            buckets: BucketStore::new(paths.buckets_file()),
            history: HistoryLedger::new(paths.history_file(), settings.date_format.clone()),
            transfers: ActivityLog::new(paths.transfer_log()),
            withdrawals: ActivityLog::new(paths.withdraw_log()),
            syncs: ActivityLog::new(paths.sync_log()),
            totals: ActivityLog::new(paths.totals_log()),
            audit: AuditLogger::new(paths.audit_log()),
            backups: BackupManager::new(paths.clone(), settings.backup_retention.clone()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Take the single-writer lock for a mutating command
    pub fn lock(&self) -> LedgerResult<LedgerLock> {
        LedgerLock::acquire(&self.paths.lock_file())
    }

    /// Archive current state before a mutation and apply retention
    pub fn backup_before(&self, reason: &str) -> LedgerResult<()> {
        let (_, pruned) = self.backups.create_backup_with_retention(reason)?;
        if !pruned.is_empty() {
            log::info!("retention removed {} old backup(s)", pruned.len());
        }
        Ok(())
    }

    /// Append an entry to the audit log
    pub fn log_audit(&self, entry: &AuditEntry) -> LedgerResult<()> {
        self.audit.log(entry)
    }

    /// Check if a bucket file exists
    pub fn is_initialized(&self) -> bool {
        self.buckets.exists()
    }
}
