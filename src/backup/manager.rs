//! Backup manager for bucket-ledger
//!
//! Handles rolling backups of the bucket file and history ledger with
//! configurable retention, plus archiving of ingested export files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths::LedgerPaths;
use crate::config::settings::BackupRetention;
use crate::error::{LedgerError, LedgerResult};

/// Current archive schema
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Whether this is a monthly backup (kept longer)
    pub is_monthly: bool,
}

/// Backup archive format
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupArchive {
    /// Schema version for migration support
    pub schema_version: u32,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// What triggered the backup (e.g. "withdraw", "ingest")
    #[serde(default)]
    pub reason: String,
    /// Bucket file contents, null when there was no bucket file
    pub buckets: serde_json::Value,
    /// Raw history ledger text, absent when there was no ledger
    pub history: Option<String>,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    paths: LedgerPaths,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: LedgerPaths, retention: BackupRetention) -> Self {
        let backup_dir = paths.backup_dir();
        Self {
            backup_dir,
            paths,
            retention,
        }
    }

    /// Create a backup of the bucket file and history ledger
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup(&self, reason: &str) -> LedgerResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create backup directory: {}", e)))?;

        let now = Utc::now();
        let mut filename = format!("backup-{}.json", backup_stamp(now));
        // Two backups in the same millisecond must not overwrite each other
        let mut suffix = 1;
        while self.backup_dir.join(&filename).exists() {
            filename = format!("backup-{}-{}.json", backup_stamp(now), suffix);
            suffix += 1;
        }
        let backup_path = self.backup_dir.join(&filename);

        let archive = self.create_archive(now, reason)?;
        let json = serde_json::to_string_pretty(&archive)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize backup: {}", e)))?;

        fs::write(&backup_path, json)
            .map_err(|e| LedgerError::Io(format!("Failed to write backup file: {}", e)))?;

        log::info!("created backup {} ({})", filename, reason);
        Ok(backup_path)
    }

    fn create_archive(&self, timestamp: DateTime<Utc>, reason: &str) -> LedgerResult<BackupArchive> {
        let history_file = self.paths.history_file();
        let history = if history_file.exists() {
            Some(fs::read_to_string(&history_file).map_err(|e| {
                LedgerError::Io(format!("Failed to read history for backup: {}", e))
            })?)
        } else {
            None
        };

        Ok(BackupArchive {
            schema_version: SCHEMA_VERSION,
            created_at: timestamp,
            reason: reason.to_string(),
            buckets: read_json_value(&self.paths.buckets_file())?,
            history,
        })
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> LedgerResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| LedgerError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = self.parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(backups)
    }

    fn parse_backup_info(&self, path: &Path) -> Option<BackupInfo> {
        let filename = path.file_name()?.to_string_lossy().to_string();

        // backup-YYYYMMDD-HHMMSS-mmm[-n].json
        let date_part = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
        let created_at = parse_backup_timestamp(date_part)?;

        let metadata = fs::metadata(path).ok()?;

        Some(BackupInfo {
            filename,
            path: path.to_path_buf(),
            created_at,
            size_bytes: metadata.len(),
            is_monthly: created_at.day() == 1,
        })
    }

    /// Enforce retention policy by deleting old backups
    pub fn enforce_retention(&self) -> LedgerResult<Vec<PathBuf>> {
        let doomed = self.expired_backups()?;
        let mut deleted = Vec::with_capacity(doomed.len());

        for backup in doomed {
            fs::remove_file(&backup.path)
                .map_err(|e| LedgerError::Io(format!("Failed to delete old backup: {}", e)))?;
            log::debug!("pruned {}", backup.filename);
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Backups the retention policy would delete
    pub fn expired_backups(&self) -> LedgerResult<Vec<BackupInfo>> {
        let (monthly, daily): (Vec<_>, Vec<_>) =
            self.list_backups()?.into_iter().partition(|b| b.is_monthly);

        Ok(daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize))
            .collect())
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention(&self, reason: &str) -> LedgerResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(reason)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get a specific backup by filename
    pub fn get_backup(&self, filename: &str) -> LedgerResult<Option<BackupInfo>> {
        let path = self.backup_dir.join(filename);
        if path.is_file() {
            Ok(self.parse_backup_info(&path))
        } else {
            Ok(None)
        }
    }

    pub fn get_latest_backup(&self) -> LedgerResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Copy processed export files into `backups/inputs/<stamp>-<name>`
    ///
    /// Returns the archive paths in input order.
    pub fn archive_inputs(&self, files: &[PathBuf]) -> LedgerResult<Vec<PathBuf>> {
        let dir = self.paths.input_archive_dir();
        fs::create_dir_all(&dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

        let stamp = backup_stamp(Utc::now());
        let mut archived = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| LedgerError::Io(format!("{} has no file name", file.display())))?;
            let target = dir.join(format!("{}-{}", stamp, name));
            fs::copy(file, &target).map_err(|e| {
                LedgerError::Io(format!("Failed to archive {}: {}", file.display(), e))
            })?;
            log::debug!("archived {} to {}", file.display(), target.display());
            archived.push(target);
        }
        Ok(archived)
    }
}

fn backup_stamp(now: DateTime<Utc>) -> String {
    format!("{}-{:03}", now.format("%Y%m%d-%H%M%S"), now.timestamp_subsec_millis())
}

/// Read a JSON file as a generic Value, null when the file doesn't exist
fn read_json_value(path: &Path) -> LedgerResult<serde_json::Value> {
    if !path.exists() {
        return Ok(serde_json::Value::Null);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| LedgerError::Io(format!("Failed to read file for backup: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| LedgerError::Json(format!("Failed to parse JSON for backup: {}", e)))
}

/// Parse a backup timestamp from the filename date part
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    // YYYYMMDD-HHMMSS, optionally followed by -mmm and a collision suffix
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 4 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    Some(DateTime::from_naive_utc_and_offset(
        chrono::NaiveDateTime::new(date, time),
        Utc,
    ))
}
