//! Backup CLI commands
//!
//! Implements CLI commands for backup management.

use clap::Subcommand;
use std::path::PathBuf;

use crate::audit::{AuditEntry, Operation};
use crate::backup::{BackupManager, RestoreManager};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create,

    /// List all available backups
    List {
        /// Show size, age and creation time for each backup
        #[arg(short, long)]
        detailed: bool,
    },

    /// Restore buckets and history from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete old backups according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(storage: &Storage, cmd: BackupCommands) -> LedgerResult<()> {
    let manager = &storage.backups;

    match cmd {
        BackupCommands::Create => {
            let backup_path = manager.create_backup("manual")?;
            println!("Backup created: {}", file_name(&backup_path));
            println!("Location: {}", backup_path.display());
        }

        BackupCommands::List { detailed } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: buckets backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let monthly_marker = if backup.is_monthly { " [monthly]" } else { "" };

                if detailed {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        monthly_marker,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(manager, &backup)?;
            let restore_manager = RestoreManager::new(storage.paths().clone());
            let validation = restore_manager.validate_backup(&backup_path)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            if !validation.reason.is_empty() {
                println!("Taken before: {}", validation.reason);
            }
            println!("Status: {}", validation.summary());
            println!();

            if !force {
                println!("WARNING: This will overwrite the bucket file and history ledger!");
                println!("To proceed, run again with --force flag:");
                println!("  buckets backup restore {} --force", backup);
                return Ok(());
            }

            let _lock = storage.lock()?;
            let pre_restore = manager.create_backup("restore")?;
            println!("Pre-restore backup saved: {}", file_name(&pre_restore));

            let result = restore_manager.restore_from_file(&backup_path)?;
            let after = if storage.buckets.exists() {
                Some(storage.buckets.load()?.balances())
            } else {
                None
            };
            storage.log_audit(&AuditEntry::reset(
                Operation::Restore,
                format!("from {}", file_name(&backup_path)),
                after,
            ))?;

            println!("Restore complete!");
            println!("{}", result.summary());
        }

        BackupCommands::Prune { force } => {
            let doomed = manager.expired_backups()?;

            if doomed.is_empty() {
                println!("No backups to prune.");
                return Ok(());
            }

            println!("{} backup(s) are past the retention policy:", doomed.len());
            for backup in &doomed {
                println!("  {}", backup.filename);
            }
            println!();

            if !force {
                println!("To delete them, run again with --force flag:");
                println!("  buckets backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> LedgerResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| LedgerError::NotFound("no backups exist yet".into()));
    }

    let path = PathBuf::from(backup);
    if path.is_file() {
        return Ok(path);
    }

    for candidate in [backup.to_string(), format!("{}.json", backup)] {
        if let Some(info) = manager.get_backup(&candidate)? {
            return Ok(info.path);
        }
    }

    Err(LedgerError::NotFound(format!("backup '{}'", backup)))
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_duration(chrono::Duration::minutes(90)), "1h");
        assert_eq!(format_duration(chrono::Duration::days(65)), "2mo");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
