//! Bucket store backed by buckets.json
//!
//! The file is a JSON list of bucket records. `BucketBook` validates the list
//! once on load and keeps the records in file order so that saving writes back
//! exactly what was read, with only the balances changed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Balances, BucketRecord, Money, RuleSet, SpendBucket, TOTAL};

use super::file_io::{read_json_required, write_json_atomic};

/// Validated contents of a bucket file
#[derive(Debug, Clone, PartialEq)]
pub struct BucketBook {
    records: Vec<BucketRecord>,
}

impl BucketBook {
    /// Validate bucket records
    ///
    /// Requires exactly one each of Savings, Needs, Wants and Total and
    /// unique names. Total carries no rules; spendable buckets carry no
    /// split; any other bucket with patterns must define a split.
    pub fn from_records(records: Vec<BucketRecord>) -> LedgerResult<Self> {
        let mut seen = BTreeSet::new();
        for record in &records {
            if record.name.trim().is_empty() {
                return Err(LedgerError::InvalidFormat("bucket with an empty name".into()));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(LedgerError::InvalidFormat(format!(
                    "bucket '{}' appears more than once",
                    record.name
                )));
            }

            if record.is_total() {
                if record.patterns.is_some() || record.split.is_some() {
                    return Err(LedgerError::InvalidFormat(
                        "'Total' cannot have patterns or a split".into(),
                    ));
                }
            } else if record.spend_bucket().is_some() {
                if record.split.is_some() {
                    return Err(LedgerError::InvalidFormat(format!(
                        "'{}' holds a balance and cannot have a split",
                        record.name
                    )));
                }
            } else if let Some(split) = &record.split {
                validate_split(&record.name, split.values())?;
            } else if !record.pattern_list().is_empty() {
                return Err(LedgerError::InvalidFormat(format!(
                    "rule-only bucket '{}' has patterns but no split",
                    record.name
                )));
            }
        }

        for required in SpendBucket::ALL.iter().map(|b| b.name()).chain([TOTAL]) {
            if !seen.contains(required) {
                return Err(LedgerError::InvalidFormat(format!(
                    "required bucket '{}' is missing",
                    required
                )));
            }
        }

        Ok(Self { records })
    }

    /// Default layout written by `init`
    pub fn starter() -> Self {
        let zero = Money::zero();
        Self {
            records: vec![
                BucketRecord::new("Savings", zero).with_patterns(Vec::<String>::new()),
                BucketRecord::new("Needs", zero).with_patterns(Vec::<String>::new()),
                BucketRecord::new("Wants", zero).with_patterns(Vec::<String>::new()),
                BucketRecord::new("Paycheck", zero)
                    .with_patterns(Vec::<String>::new())
                    .with_split([
                        ("Savings", Decimal::new(3, 1)),
                        ("Needs", Decimal::new(6, 1)),
                        ("Wants", Decimal::new(1, 1)),
                    ]),
                BucketRecord::new(TOTAL, zero),
            ],
        }
    }

    pub fn records(&self) -> &[BucketRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<BucketRecord> {
        self.records
    }

    fn amount_of(&self, name: &str) -> Money {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.amount)
            .unwrap_or_default()
    }

    /// Current balances as stored (Total is taken as-is, not recomputed)
    pub fn balances(&self) -> Balances {
        Balances {
            savings: self.amount_of(SpendBucket::Savings.name()),
            needs: self.amount_of(SpendBucket::Needs.name()),
            wants: self.amount_of(SpendBucket::Wants.name()),
            total: self.amount_of(TOTAL),
        }
    }

    /// Write balances back into the records
    pub fn set_balances(&mut self, balances: &Balances) {
        for record in &mut self.records {
            if let Some(bucket) = record.spend_bucket() {
                record.amount = balances.get(bucket);
            } else if record.is_total() {
                record.amount = balances.total;
            }
        }
    }

    /// Categorization rules in file order
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::from_records(&self.records)
    }
}

fn validate_split<'a>(
    name: &str,
    fractions: impl Iterator<Item = &'a Decimal>,
) -> LedgerResult<()> {
    let mut sum = Decimal::ZERO;
    for fraction in fractions {
        if fraction.is_sign_negative() {
            return Err(LedgerError::InvalidFormat(format!(
                "split of '{}' has a negative fraction",
                name
            )));
        }
        sum += *fraction;
    }
    if sum != Decimal::ONE {
        log::warn!("split of '{}' sums to {} instead of 1", name, sum);
    }
    Ok(())
}

/// Loads and saves the bucket file
pub struct BucketStore {
    path: PathBuf,
}

impl BucketStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the bucket file
    pub fn load(&self) -> LedgerResult<BucketBook> {
        Self::load_from(&self.path)
    }

    /// Load and validate any bucket file (used when syncing from another copy)
    pub fn load_from(path: &Path) -> LedgerResult<BucketBook> {
        let records: Vec<BucketRecord> = read_json_required(path)?;
        BucketBook::from_records(records).map_err(|e| match e {
            LedgerError::InvalidFormat(msg) => {
                LedgerError::InvalidFormat(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Save the bucket file atomically
    pub fn save(&self, book: &BucketBook) -> LedgerResult<()> {
        write_json_atomic(&self.path, &book.records)?;
        log::debug!("saved {}", self.path.display());
        Ok(())
    }
}
