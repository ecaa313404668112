//! Storage initialization
//!
//! Handles first-run setup: the starter bucket file and default settings.

use crate::audit::{AuditEntry, Operation};
use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};

use super::buckets::BucketBook;
use super::Storage;

/// Write the starter bucket file and settings
///
/// Refuses to replace an existing bucket file unless `force` is set, in which
/// case the current state is backed up first. Existing settings are kept.
pub fn initialize_storage(
    storage: &Storage,
    settings: &Settings,
    force: bool,
) -> LedgerResult<BucketBook> {
    let paths = storage.paths();
    let _lock = storage.lock()?;

    if storage.is_initialized() {
        if !force {
            return Err(LedgerError::Config(format!(
                "{} already exists (use --force to overwrite)",
                paths.buckets_file().display()
            )));
        }
        storage.backup_before("init")?;
    }

    let book = BucketBook::starter();
    storage.buckets.save(&book)?;

    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    storage.log_audit(&AuditEntry::reset(
        Operation::Init,
        "starter buckets",
        Some(book.balances()),
    ))?;

    Ok(book)
}

/// Check if storage needs initialization
pub fn needs_initialization(storage: &Storage) -> bool {
    !storage.is_initialized()
}
