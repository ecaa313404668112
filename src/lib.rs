//! bucket-ledger - keyword-driven Savings / Needs / Wants bookkeeping
//!
//! This library provides the core of the `buckets` command line tool. It reads
//! CSV exports from a bank, matches each transaction against an ordered list of
//! keyword rules, and credits the amount to one of three spending buckets
//! (Savings, Needs, Wants) or splits a paycheck across all three. A history
//! ledger of processed transactions makes repeated ingestion of overlapping
//! exports idempotent.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Money, buckets, rules and transaction rows
//! - `storage`: Bucket file, CSV ledgers, locking
//! - `services`: Ingestion, categorization, transfers, sync
//! - `audit`: Audit logging system
//! - `backup`: Automatic backup management
//! - `cli`, `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use bucket_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use bucket_ledger::services::{IngestOptions, IngestService};
//! use bucket_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths, &settings)?;
//! let report = IngestService::new(&storage, &settings).run(&IngestOptions::default())?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
