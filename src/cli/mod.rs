//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod buckets;
pub mod ingest;
pub mod transfer;

pub use backup::{handle_backup_command, BackupCommands};
pub use buckets::{
    handle_config_command, handle_init_command, handle_snapshot_command, handle_status_command,
    handle_sync_command,
};
pub use ingest::handle_ingest_command;
pub use transfer::{handle_transfer_command, handle_withdraw_command};
