//! Path management for bucket-ledger
//!
//! Provides path resolution for the bucket file, ledgers, backups and inputs.
//!
//! ## Path Resolution Order
//!
//! 1. Explicit directory (the `--dir` flag)
//! 2. `BUCKET_LEDGER_DIR` environment variable (if set)
//! 3. The platform config directory (`~/.config/bucket-ledger` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::LedgerError;

/// Environment variable overriding the data directory
pub const DIR_ENV: &str = "BUCKET_LEDGER_DIR";

/// Manages all paths used by bucket-ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the base directory from the environment or platform defaults
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, LedgerError> {
        let base_dir = if let Ok(custom) = std::env::var(DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "bucket-ledger")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    LedgerError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Settings file (config.json)
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// The bucket store (buckets.json)
    pub fn buckets_file(&self) -> PathBuf {
        self.base_dir.join("buckets.json")
    }

    /// JSONL audit trail
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Lock file held while a command mutates state
    pub fn lock_file(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    /// Default directory scanned for bank exports
    pub fn input_dir(&self) -> PathBuf {
        self.base_dir.join("input")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.base_dir.join("history")
    }

    /// Ingestion history ledger
    pub fn history_file(&self) -> PathBuf {
        self.history_dir().join("history.csv")
    }

    pub fn transfer_log(&self) -> PathBuf {
        self.history_dir().join("transfer_log.csv")
    }

    pub fn withdraw_log(&self) -> PathBuf {
        self.history_dir().join("withdraw_log.csv")
    }

    pub fn sync_log(&self) -> PathBuf {
        self.history_dir().join("sync_log.csv")
    }

    /// Timestamped Total values recorded by `snapshot`
    pub fn totals_log(&self) -> PathBuf {
        self.history_dir().join("total_history.csv")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Where ingested export files are archived
    pub fn input_archive_dir(&self) -> PathBuf {
        self.backup_dir().join("inputs")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        for dir in [
            self.base_dir.clone(),
            self.history_dir(),
            self.backup_dir(),
            self.input_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                LedgerError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Check whether a bucket file has been created
    pub fn is_initialized(&self) -> bool {
        self.buckets_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.buckets_file(), temp_dir.path().join("buckets.json"));
        assert_eq!(
            paths.history_file(),
            temp_dir.path().join("history").join("history.csv")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().join("ledger"));

        paths.ensure_directories().unwrap();

        assert!(paths.history_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(paths.input_dir().exists());
        assert!(!paths.is_initialized());
    }
}
