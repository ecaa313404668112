//! Total snapshots
//!
//! Records the current Total with a timestamp so balance over time can be
//! charted elsewhere.

use crate::error::LedgerResult;
use crate::storage::{now_timestamp, Storage, TotalSnapshot};

pub struct SnapshotService<'a> {
    storage: &'a Storage,
}

impl<'a> SnapshotService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Append the current Total to the totals log
    pub fn record(&self) -> LedgerResult<TotalSnapshot> {
        let _lock = self.storage.lock()?;
        let balances = self.storage.buckets.load()?.balances();

        let snapshot = TotalSnapshot {
            timestamp: now_timestamp(),
            total: balances.total,
        };
        self.storage.totals.append(&snapshot)?;
        log::info!("recorded total {}", snapshot.total);
        Ok(snapshot)
    }

    /// All recorded snapshots, oldest first
    pub fn list(&self) -> LedgerResult<Vec<TotalSnapshot>> {
        self.storage.totals.read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::config::settings::Settings;
    use crate::models::Money;
    use crate::services::TransferService;
    use crate::storage::BucketBook;
    use tempfile::TempDir;

    #[test]
    fn test_snapshots_track_total() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        let mut book = BucketBook::starter();
        let mut balances = book.balances();
        balances.savings = Money::from_dollars(80);
        balances.recompute_total();
        book.set_balances(&balances);
        storage.buckets.save(&book).unwrap();

        let service = SnapshotService::new(&storage);
        service.record().unwrap();
        TransferService::new(&storage)
            .withdraw("Savings", Money::from_dollars(30), "gift")
            .unwrap();
        service.record().unwrap();

        let totals: Vec<_> = service.list().unwrap().iter().map(|s| s.total).collect();
        assert_eq!(totals, vec![Money::from_dollars(80), Money::from_dollars(50)]);
    }

    #[test]
    fn test_list_without_snapshots() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        assert!(SnapshotService::new(&storage).list().unwrap().is_empty());
    }
}
