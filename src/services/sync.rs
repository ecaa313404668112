//! Bucket sync
//!
//! Replaces the bucket file with another copy, e.g. one edited on a
//! different machine. The incoming file is validated in full first.

use std::path::Path;

use crate::audit::{AuditEntry, Operation};
use crate::error::LedgerResult;
use crate::storage::{now_timestamp, BucketStore, Storage, SyncRecord};

use super::transfer::BalanceChange;

/// Service for syncing the bucket file from another copy
pub struct SyncService<'a> {
    storage: &'a Storage,
}

impl<'a> SyncService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Replace the bucket file with `source`
    ///
    /// Total is recomputed from the incoming balances.
    pub fn sync_from(&self, source: &Path) -> LedgerResult<BalanceChange> {
        let mut incoming = BucketStore::load_from(source)?;

        let _lock = self.storage.lock()?;
        let before = if self.storage.buckets.exists() {
            self.storage.buckets.load()?.balances()
        } else {
            Default::default()
        };

        let mut after = incoming.balances();
        if !after.is_consistent() {
            log::warn!(
                "{} has Total {} but buckets sum to {}; recomputing",
                source.display(),
                after.total,
                after.spendable_sum()
            );
        }
        after.recompute_total();
        incoming.set_balances(&after);

        self.storage.backup_before("sync")?;
        self.storage.buckets.save(&incoming)?;
        self.storage.syncs.append(&SyncRecord {
            timestamp: now_timestamp(),
            source: source.display().to_string(),
        })?;
        self.storage.log_audit(&AuditEntry::balance_change(
            Operation::Sync,
            format!("from {}", source.display()),
            before,
            after,
        ))?;

        log::info!("synced buckets from {}", source.display());
        Ok(BalanceChange { before, after })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::config::settings::Settings;
    use crate::error::LedgerError;
    use crate::models::{BucketRecord, Money};
    use crate::storage::BucketBook;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().join("data"));
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        storage.buckets.save(&BucketBook::starter()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_sync_replaces_and_recomputes_total() {
        let (temp, storage) = setup();
        let source = temp.path().join("other.json");
        BucketStore::new(source.clone())
            .save(
                &BucketBook::from_records(vec![
                    BucketRecord::new("Savings", Money::from_dollars(10)),
                    BucketRecord::new("Needs", Money::from_dollars(20)),
                    BucketRecord::new("Wants", Money::from_dollars(30)),
                    BucketRecord::new("Total", Money::from_dollars(999)),
                ])
                .unwrap(),
            )
            .unwrap();

        let change = SyncService::new(&storage).sync_from(&source).unwrap();

        assert_eq!(change.after.total, Money::from_dollars(60));
        let stored = storage.buckets.load().unwrap().balances();
        assert_eq!(stored, change.after);
        assert!(stored.is_consistent());
        assert_eq!(storage.syncs.read_all().unwrap().len(), 1);
        assert_eq!(storage.backups.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_source_changes_nothing() {
        let (temp, storage) = setup();
        let source = temp.path().join("broken.json");
        std::fs::write(&source, r#"[{"name": "Savings", "amount": 1}]"#).unwrap();

        let err = SyncService::new(&storage).sync_from(&source).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));
        assert_eq!(storage.buckets.load().unwrap(), BucketBook::starter());
        assert!(!storage.syncs.path().exists());
    }

    #[test]
    fn test_missing_source() {
        let (temp, storage) = setup();
        let err = SyncService::new(&storage)
            .sync_from(&temp.path().join("nope.json"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
