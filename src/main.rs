use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use bucket_ledger::cli::{
    handle_backup_command, handle_config_command, handle_ingest_command, handle_init_command,
    handle_snapshot_command, handle_status_command, handle_sync_command, handle_transfer_command,
    handle_withdraw_command, BackupCommands,
};
use bucket_ledger::config::paths::{LedgerPaths, DIR_ENV};
use bucket_ledger::config::settings::Settings;
use bucket_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "buckets",
    version,
    about = "Sort bank exports into Savings, Needs and Wants buckets",
    long_about = "bucket-ledger reads CSV exports from your bank, matches each \
                  transaction against keyword rules and credits it to a Savings, \
                  Needs or Wants bucket. Every transaction is applied exactly once, \
                  no matter how often the same export is ingested."
)]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = DIR_ENV, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the bucket file with zero balances
    Init {
        /// Overwrite an existing bucket file (a backup is taken first)
        #[arg(short, long)]
        force: bool,
    },

    /// Show bucket balances and rules
    #[command(alias = "show")]
    Status,

    /// Apply new transactions from the input directory
    Ingest {
        /// Read exports from this directory instead of the configured one
        #[arg(value_name = "DIR")]
        input: Option<PathBuf>,

        /// Show what would change without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Leave the input files in place after a successful run
        #[arg(short, long)]
        keep_inputs: bool,
    },

    /// Move money between two buckets
    Transfer {
        /// Bucket to take the money from
        from: String,
        /// Bucket to put the money in
        to: String,
        /// Amount, e.g. 50 or 50.25
        amount: String,
        /// Free-form reason recorded in the transfer log
        #[arg(default_value = "")]
        reason: String,
    },

    /// Take money out of a bucket
    Withdraw {
        /// Bucket to withdraw from
        bucket: String,
        /// Amount, e.g. 50 or 50.25
        amount: String,
        /// Free-form reason recorded in the withdraw log
        #[arg(default_value = "")]
        reason: String,
    },

    /// Replace the bucket file with an externally maintained copy
    Sync {
        /// Path to the bucket file to copy from
        source: PathBuf,
    },

    /// Record the current Total in the totals log
    Snapshot {
        /// List recorded snapshots instead of recording one
        #[arg(short, long)]
        list: bool,
    },

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = match cli.dir {
        Some(dir) => LedgerPaths::with_base_dir(dir),
        None => LedgerPaths::new()?,
    };
    log::debug!("Using data directory {}", paths.base_dir().display());

    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::new(paths, &settings)?;

    match cli.command {
        Some(Commands::Init { force }) => {
            handle_init_command(&storage, &settings, force)?;
        }
        Some(Commands::Status) => {
            handle_status_command(&storage, &settings)?;
        }
        Some(Commands::Ingest {
            input,
            dry_run,
            keep_inputs,
        }) => {
            handle_ingest_command(&storage, &settings, input, dry_run, keep_inputs)?;
        }
        Some(Commands::Transfer {
            from,
            to,
            amount,
            reason,
        }) => {
            handle_transfer_command(&storage, &settings, &from, &to, &amount, &reason)?;
        }
        Some(Commands::Withdraw {
            bucket,
            amount,
            reason,
        }) => {
            handle_withdraw_command(&storage, &settings, &bucket, &amount, &reason)?;
        }
        Some(Commands::Sync { source }) => {
            handle_sync_command(&storage, &settings, &source)?;
        }
        Some(Commands::Snapshot { list }) => {
            handle_snapshot_command(&storage, &settings, list)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&storage, cmd)?;
        }
        Some(Commands::Config) => {
            handle_config_command(&storage, &settings)?;
        }
        None => {
            println!("bucket-ledger - keyword rules for Savings, Needs and Wants");
            println!();
            println!("Run 'buckets --help' for usage information.");
            println!("Run 'buckets init' to create the bucket file.");
        }
    }

    Ok(())
}
