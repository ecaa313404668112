//! Display formatting for terminal output
//!
//! Provides utilities for formatting balances, rules and run summaries.

pub mod buckets;

pub use buckets::{format_balance_change, format_balances, format_ingest_report, format_rules};
