//! Backup system for bucket-ledger
//!
//! Every mutating command archives the bucket file and history ledger before
//! it writes anything, so any state can be rolled back.
//!
//! # Backup Format
//!
//! Backups are JSON files named `backup-YYYYMMDD-HHMMSS-mmm.json`:
//! - `schema_version`: Version for migration support
//! - `created_at`: Timestamp when backup was created
//! - `reason`: The command that triggered the backup
//! - `buckets`: Bucket file contents (null if absent)
//! - `history`: Raw history ledger text (null if absent)
//!
//! # Retention Policy
//!
//! By default, the system keeps:
//! - 30 daily backups
//! - 12 monthly backups (created on the first of a month)

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, SCHEMA_VERSION};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
