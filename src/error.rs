//! Custom error types for bucket-ledger
//!
//! This module defines the error hierarchy for the ledger using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::Money;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A bucket name outside Savings/Needs/Wants was used where a spendable
    /// bucket is required
    #[error("Invalid bucket '{0}': only 'Savings', 'Needs', or 'Wants' can be chosen")]
    InvalidBucket(String),

    /// Transfer source and destination are the same bucket
    #[error("Source and destination buckets must be different (both are '{0}')")]
    SameBucket(String),

    /// The source bucket cannot cover the requested amount
    #[error("Insufficient funds in '{bucket}': need {needed}, have {available}")]
    InsufficientFunds {
        bucket: String,
        needed: Money,
        available: Money,
    },

    /// A split rule names a bucket that is not in the bucket store
    #[error("Bucket '{0}' is missing from the bucket file")]
    UnknownBucket(String),

    /// An export or ledger row could not be interpreted
    #[error("Malformed row {row} in {file}: {reason}")]
    MalformedRow {
        file: String,
        row: usize,
        reason: String,
    },

    /// Ingestion needs exactly one or two export files
    #[error("Expected 1 or 2 input files, found {0}")]
    InvalidInputCount(usize),

    /// A required file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// A file exists but its contents are not valid
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Amounts given to transfer/withdraw must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Another invocation holds the ledger lock
    #[error("Ledger is locked: {0}")]
    Locked(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a malformed-row error
    pub fn malformed(file: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            file: file.into(),
            row,
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error was raised by input validation, before any mutation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidBucket(_)
                | Self::SameBucket(_)
                | Self::InsufficientFunds { .. }
                | Self::InvalidAmount(_)
                | Self::InvalidInputCount(_)
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidInputCount(3);
        assert_eq!(err.to_string(), "Expected 1 or 2 input files, found 3");
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = LedgerError::InsufficientFunds {
            bucket: "Needs".into(),
            needed: Money::from_cents(5000),
            available: Money::from_cents(3000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in 'Needs': need $50.00, have $30.00"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_malformed_row() {
        let err = LedgerError::malformed("checking.csv", 4, "both Debit and Credit are empty");
        assert_eq!(
            err.to_string(),
            "Malformed row 4 in checking.csv: both Debit and Credit are empty"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
