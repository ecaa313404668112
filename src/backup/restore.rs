//! Backup restoration for bucket-ledger
//!
//! Restores the bucket file and history ledger from a backup archive. The
//! archive is fully validated before anything on disk is touched.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::BucketRecord;
use crate::storage::buckets::BucketBook;
use crate::storage::file_io::{write_bytes_atomic, write_json_atomic};

use super::manager::{BackupArchive, SCHEMA_VERSION};

/// Handles restoring from backups
pub struct RestoreManager {
    paths: LedgerPaths,
}

impl RestoreManager {
    pub fn new(paths: LedgerPaths) -> Self {
        Self { paths }
    }

    /// Restore data from a backup file
    ///
    /// Overwrites the bucket file and history ledger with the archive
    /// contents. Callers take a fresh backup first.
    pub fn restore_from_file(&self, backup_path: &Path) -> LedgerResult<RestoreResult> {
        let archive = read_archive(backup_path)?;
        self.restore_from_archive(&archive)
    }

    /// Restore data from a parsed backup archive
    pub fn restore_from_archive(&self, archive: &BackupArchive) -> LedgerResult<RestoreResult> {
        let book = validate_buckets(archive)?;
        self.paths.ensure_directories()?;

        let mut result = RestoreResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            ..RestoreResult::default()
        };

        if let Some(book) = book {
            write_json_atomic(self.paths.buckets_file(), book.records())?;
            result.buckets_restored = true;
        }

        let history_file = self.paths.history_file();
        match &archive.history {
            Some(text) => {
                write_bytes_atomic(&history_file, text.as_bytes())?;
                result.history_restored = true;
            }
            // The ledger did not exist yet when the archive was taken
            None if history_file.exists() => {
                fs::remove_file(&history_file).map_err(|e| {
                    LedgerError::Io(format!("Failed to remove {}: {}", history_file.display(), e))
                })?;
                result.history_restored = true;
            }
            None => {}
        }

        log::info!("restored backup from {}", archive.created_at);
        Ok(result)
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> LedgerResult<ValidationResult> {
        let archive = read_archive(backup_path)?;
        let book = validate_buckets(&archive)?;

        Ok(ValidationResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            reason: archive.reason.clone(),
            has_buckets: book.is_some(),
            has_history: archive.history.is_some(),
        })
    }
}

fn read_archive(backup_path: &Path) -> LedgerResult<BackupArchive> {
    let contents = fs::read_to_string(backup_path).map_err(|e| {
        LedgerError::Io(format!("Failed to read backup file {}: {}", backup_path.display(), e))
    })?;

    let archive: BackupArchive = serde_json::from_str(&contents).map_err(|e| {
        LedgerError::InvalidFormat(format!("{}: {}", backup_path.display(), e))
    })?;

    if archive.schema_version > SCHEMA_VERSION {
        return Err(LedgerError::InvalidFormat(format!(
            "{} has schema version {}, newer than supported version {}",
            backup_path.display(),
            archive.schema_version,
            SCHEMA_VERSION
        )));
    }
    Ok(archive)
}

fn validate_buckets(archive: &BackupArchive) -> LedgerResult<Option<BucketBook>> {
    if archive.buckets.is_null() {
        return Ok(None);
    }
    let records: Vec<BucketRecord> = serde_json::from_value(archive.buckets.clone())
        .map_err(|e| LedgerError::InvalidFormat(format!("backup bucket data: {}", e)))?;
    BucketBook::from_records(records).map(Some)
}

/// Result of a restore operation
#[derive(Debug, Default)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub buckets_restored: bool,
    pub history_restored: bool,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.buckets_restored {
            parts.push("buckets");
        }
        if self.history_restored {
            parts.push("history");
        }
        if parts.is_empty() {
            "Nothing to restore".to_string()
        } else {
            format!("Restored: {}", parts.join(", "))
        }
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub reason: String,
    pub has_buckets: bool,
    pub has_history: bool,
}

impl ValidationResult {
    pub fn summary(&self) -> String {
        let mut present = Vec::new();
        if self.has_buckets {
            present.push("buckets");
        }
        if self.has_history {
            present.push("history");
        }
        if present.is_empty() {
            "Empty backup".to_string()
        } else {
            format!("Contains: {}", present.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::config::settings::BackupRetention;
    use crate::models::Money;
    use crate::storage::buckets::BucketStore;
    use tempfile::TempDir;

    fn setup() -> (LedgerPaths, BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let manager = BackupManager::new(paths.clone(), BackupRetention::default());
        (paths, manager, temp_dir)
    }

    #[test]
    fn test_restore_round_trip() {
        let (paths, manager, _temp) = setup();
        let store = BucketStore::new(paths.buckets_file());
        store.save(&BucketBook::starter()).unwrap();
        fs::write(paths.history_file(), "Date,Description,Debit,Credit,BucketsHit\n").unwrap();

        let backup = manager.create_backup("before change").unwrap();

        // Change state after the backup
        let mut book = store.load().unwrap();
        let mut balances = book.balances();
        balances.savings = Money::from_dollars(999);
        balances.recompute_total();
        book.set_balances(&balances);
        store.save(&book).unwrap();
        fs::remove_file(paths.history_file()).unwrap();

        let result = RestoreManager::new(paths.clone()).restore_from_file(&backup).unwrap();
        assert!(result.buckets_restored);
        assert!(result.history_restored);
        assert_eq!(store.load().unwrap(), BucketBook::starter());
        assert!(paths.history_file().exists());
    }

    #[test]
    fn test_restore_removes_history_that_did_not_exist() {
        let (paths, manager, _temp) = setup();
        BucketStore::new(paths.buckets_file()).save(&BucketBook::starter()).unwrap();
        let backup = manager.create_backup("fresh").unwrap();

        fs::write(paths.history_file(), "Date,BucketsHit\n").unwrap();
        RestoreManager::new(paths.clone()).restore_from_file(&backup).unwrap();
        assert!(!paths.history_file().exists());
    }

    #[test]
    fn test_invalid_archive_touches_nothing() {
        let (paths, _manager, temp) = setup();
        BucketStore::new(paths.buckets_file()).save(&BucketBook::starter()).unwrap();
        let before = fs::read_to_string(paths.buckets_file()).unwrap();

        let bad = temp.path().join("backups").join("backup-20250101-000000-000.json");
        fs::write(
            &bad,
            r#"{"schema_version": 1, "created_at": "2025-01-01T00:00:00Z",
                "buckets": [{"name": "Savings", "amount": 1}], "history": null}"#,
        )
        .unwrap();

        let restore = RestoreManager::new(paths.clone());
        assert!(matches!(
            restore.restore_from_file(&bad),
            Err(LedgerError::InvalidFormat(_))
        ));
        assert!(restore.validate_backup(&bad).is_err());
        assert_eq!(fs::read_to_string(paths.buckets_file()).unwrap(), before);
    }

    #[test]
    fn test_validate_backup() {
        let (paths, manager, _temp) = setup();
        BucketStore::new(paths.buckets_file()).save(&BucketBook::starter()).unwrap();
        let backup = manager.create_backup("check").unwrap();

        let validation = RestoreManager::new(paths).validate_backup(&backup).unwrap();
        assert!(validation.has_buckets);
        assert!(!validation.has_history);
        assert_eq!(validation.reason, "check");
        assert_eq!(validation.summary(), "Contains: buckets");
    }
}
