//! Core data models for bucket-ledger
//!
//! This module contains the data structures of the budgeting domain:
//! money, buckets and balances, categorization rules, and transactions.

pub mod bucket;
pub mod money;
pub mod rules;
pub mod transaction;

pub use bucket::{Balances, BucketRecord, BucketsHit, SpendBucket, TOTAL};
pub use money::{Money, MoneyParseError};
pub use rules::{matches_any, Rule, RuleSet};
pub use transaction::{parse_currency, HistoryEntry, TransactionKey, TransactionRow};
