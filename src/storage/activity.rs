//! Activity logs for manual operations
//!
//! Transfers, withdrawals, bucket syncs and Total snapshots each get their own
//! append-only CSV file with a fixed header.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, SpendBucket};

use super::csv_log::CsvLog;

/// A row type stored in an activity log
pub trait LogRecord: Sized {
    const HEADER: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;

    fn from_row(row: &[&str]) -> Result<Self, String>;
}

fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s.trim()).map_err(|e| format!("bad timestamp '{}': {}", s, e))
}

fn parse_amount(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

fn parse_bucket(s: &str) -> Result<SpendBucket, String> {
    SpendBucket::parse(s).map_err(|e| e.to_string())
}

/// Current local time in the format used by every log
pub fn now_timestamp() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub from: SpendBucket,
    pub to: SpendBucket,
    pub amount: Money,
    pub reason: String,
}

impl LogRecord for TransferRecord {
    const HEADER: &'static [&'static str] = &["timestamp", "from_bucket", "to_bucket", "amount", "reason"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339(),
            self.from.name().to_string(),
            self.to.name().to_string(),
            self.amount.to_plain_string(),
            self.reason.clone(),
        ]
    }

    fn from_row(row: &[&str]) -> Result<Self, String> {
        match row {
            [timestamp, from, to, amount, reason, ..] => Ok(Self {
                timestamp: parse_timestamp(timestamp)?,
                from: parse_bucket(from)?,
                to: parse_bucket(to)?,
                amount: parse_amount(amount)?,
                reason: reason.to_string(),
            }),
            _ => Err("expected 5 columns".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub bucket: SpendBucket,
    pub amount: Money,
    pub reason: String,
}

impl LogRecord for WithdrawRecord {
    const HEADER: &'static [&'static str] = &["timestamp", "bucket", "amount", "reason"];

    fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339(),
            self.bucket.name().to_string(),
            self.amount.to_plain_string(),
            self.reason.clone(),
        ]
    }

    fn from_row(row: &[&str]) -> Result<Self, String> {
        match row {
            [timestamp, bucket, amount, reason, ..] => Ok(Self {
                timestamp: parse_timestamp(timestamp)?,
                bucket: parse_bucket(bucket)?,
                amount: parse_amount(amount)?,
                reason: reason.to_string(),
            }),
            _ => Err("expected 4 columns".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub source: String,
}

impl LogRecord for SyncRecord {
    const HEADER: &'static [&'static str] = &["sync_timestamp", "source"];

    fn to_row(&self) -> Vec<String> {
        vec![self.timestamp.to_rfc3339(), self.source.clone()]
    }

    fn from_row(row: &[&str]) -> Result<Self, String> {
        match row {
            [timestamp, source, ..] => Ok(Self {
                timestamp: parse_timestamp(timestamp)?,
                source: source.to_string(),
            }),
            _ => Err("expected 2 columns".into()),
        }
    }
}

/// A recorded Total value, the data points of the balance-over-time history
#[derive(Debug, Clone, PartialEq)]
pub struct TotalSnapshot {
    pub timestamp: DateTime<FixedOffset>,
    pub total: Money,
}

impl LogRecord for TotalSnapshot {
    const HEADER: &'static [&'static str] = &["Date", "Total"];

    fn to_row(&self) -> Vec<String> {
        vec![self.timestamp.to_rfc3339(), self.total.to_plain_string()]
    }

    fn from_row(row: &[&str]) -> Result<Self, String> {
        match row {
            [timestamp, total, ..] => Ok(Self {
                timestamp: parse_timestamp(timestamp)?,
                total: parse_amount(total)?,
            }),
            _ => Err("expected 2 columns".into()),
        }
    }
}

/// Typed append-only log
pub struct ActivityLog<T> {
    log: CsvLog,
    _record: PhantomData<T>,
}

impl<T: LogRecord> ActivityLog<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            log: CsvLog::new(path),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn append(&self, record: &T) -> LedgerResult<()> {
        self.log.append_records(T::HEADER, &[record.to_row()])
    }

    pub fn read_all(&self) -> LedgerResult<Vec<T>> {
        let table = self.log.read()?;
        table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let fields: Vec<&str> = record.iter().collect();
                T::from_row(&fields).map_err(|reason| {
                    LedgerError::InvalidFormat(format!(
                        "{} row {}: {}",
                        self.path().display(),
                        idx + 1,
                        reason
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_withdraw_log_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let log: ActivityLog<WithdrawRecord> = ActivityLog::new(temp_dir.path().join("w.csv"));

        let record = WithdrawRecord {
            timestamp: parse_timestamp("2025-01-15T10:30:00-05:00").unwrap(),
            bucket: SpendBucket::Needs,
            amount: Money::from_dollars(50),
            reason: "groceries, weekly".into(),
        };
        log.append(&record).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            "timestamp,bucket,amount,reason\n2025-01-15T10:30:00-05:00,Needs,50.00,\"groceries, weekly\"\n"
        );
        assert_eq!(log.read_all().unwrap(), vec![record]);
    }

    #[test]
    fn test_transfer_log_appends() {
        let temp_dir = TempDir::new().unwrap();
        let log: ActivityLog<TransferRecord> = ActivityLog::new(temp_dir.path().join("t.csv"));

        for reason in ["rebalance", "vacation"] {
            log.append(&TransferRecord {
                timestamp: now_timestamp(),
                from: SpendBucket::Savings,
                to: SpendBucket::Wants,
                amount: Money::from_cents(2599),
                reason: reason.into(),
            })
            .unwrap();
        }

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].reason, "vacation");
        assert_eq!(records[0].amount, Money::from_cents(2599));
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let log: ActivityLog<TotalSnapshot> = ActivityLog::new(temp_dir.path().join("totals.csv"));
        std::fs::write(log.path(), "Date,Total\nyesterday,12\n").unwrap();
        assert!(matches!(log.read_all(), Err(LedgerError::InvalidFormat(_))));
    }
}
