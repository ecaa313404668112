//! Audit logging for bucket-ledger
//!
//! Every committed command appends one entry to `audit.log` with the
//! balances before and after it.
//!
//! - `AuditEntry`: timestamp, operation, detail and before/after balances
//! - `AuditLogger`: appends entries as line-delimited JSON (JSONL)
//! - `generate_diff`: human-readable summary of changed balances

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
