//! Bucket model
//!
//! A bucket file is a list of named records. Three of them (Savings, Needs,
//! Wants) hold spendable balances, `Total` mirrors their sum, and any other
//! record is a rule-only pseudo-bucket such as `Paycheck`.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Money;
use crate::error::LedgerError;

/// Name of the aggregate bucket
pub const TOTAL: &str = "Total";

/// One of the three buckets that carry a real balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpendBucket {
    Savings,
    Needs,
    Wants,
}

impl SpendBucket {
    /// All spendable buckets, in canonical order
    pub const ALL: [SpendBucket; 3] = [SpendBucket::Savings, SpendBucket::Needs, SpendBucket::Wants];

    /// The bucket's name as it appears in the bucket file
    pub const fn name(&self) -> &'static str {
        match self {
            SpendBucket::Savings => "Savings",
            SpendBucket::Needs => "Needs",
            SpendBucket::Wants => "Wants",
        }
    }

    /// Single-letter code recorded in the history ledger
    pub const fn code(&self) -> &'static str {
        match self {
            SpendBucket::Savings => "S",
            SpendBucket::Needs => "N",
            SpendBucket::Wants => "W",
        }
    }

    /// Exact lookup by bucket-file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Parse a user-supplied bucket name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, LedgerError> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidBucket(name.to_string()))
    }
}

impl fmt::Display for SpendBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which bucket(s) a processed transaction affected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketsHit {
    Single(SpendBucket),
    /// Credited across buckets by a split rule
    Split,
}

impl BucketsHit {
    /// Column name in the history ledger
    pub const COLUMN: &'static str = "BucketsHit";

    pub fn code(&self) -> &'static str {
        match self {
            BucketsHit::Single(bucket) => bucket.code(),
            BucketsHit::Split => "SNW",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "S" => Some(BucketsHit::Single(SpendBucket::Savings)),
            "N" => Some(BucketsHit::Single(SpendBucket::Needs)),
            "W" => Some(BucketsHit::Single(SpendBucket::Wants)),
            "SNW" => Some(BucketsHit::Split),
            _ => None,
        }
    }
}

impl fmt::Display for BucketsHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single record of the bucket file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,

    pub amount: Money,

    /// Case-insensitive substrings that route a transaction to this bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,

    /// Fractions of a matching deposit credited to each named bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<BTreeMap<String, Decimal>>,
}

impl BucketRecord {
    pub fn new(name: impl Into<String>, amount: Money) -> Self {
        Self {
            name: name.into(),
            amount,
            patterns: None,
            split: None,
        }
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_split<I, S>(mut self, split: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        self.split = Some(split.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// Configured patterns, empty if none
    pub fn pattern_list(&self) -> &[String] {
        self.patterns.as_deref().unwrap_or(&[])
    }

    pub fn is_total(&self) -> bool {
        self.name == TOTAL
    }

    pub fn spend_bucket(&self) -> Option<SpendBucket> {
        SpendBucket::from_name(&self.name)
    }
}

/// Mutable balances of the three spendable buckets plus the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub savings: Money,
    pub needs: Money,
    pub wants: Money,
    pub total: Money,
}

impl Balances {
    /// Build balances with `total` already consistent
    pub fn new(savings: Money, needs: Money, wants: Money) -> Self {
        let mut balances = Self {
            savings,
            needs,
            wants,
            total: Money::zero(),
        };
        balances.recompute_total();
        balances
    }

    pub fn get(&self, bucket: SpendBucket) -> Money {
        match bucket {
            SpendBucket::Savings => self.savings,
            SpendBucket::Needs => self.needs,
            SpendBucket::Wants => self.wants,
        }
    }

    fn slot(&mut self, bucket: SpendBucket) -> &mut Money {
        match bucket {
            SpendBucket::Savings => &mut self.savings,
            SpendBucket::Needs => &mut self.needs,
            SpendBucket::Wants => &mut self.wants,
        }
    }

    /// Add a signed amount to one bucket; `total` is not touched
    pub fn credit(&mut self, bucket: SpendBucket, amount: Money) {
        *self.slot(bucket) += amount;
    }

    /// Sum of the spendable buckets
    pub fn spendable_sum(&self) -> Money {
        self.savings + self.needs + self.wants
    }

    /// Restore `total == savings + needs + wants`
    pub fn recompute_total(&mut self) {
        self.total = self.spendable_sum();
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.spendable_sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_bucket_parse() {
        assert_eq!(SpendBucket::parse("Needs").unwrap(), SpendBucket::Needs);
        assert_eq!(SpendBucket::parse(" savings ").unwrap(), SpendBucket::Savings);
        assert!(matches!(
            SpendBucket::parse("Total"),
            Err(LedgerError::InvalidBucket(_))
        ));
        assert!(SpendBucket::parse("Paycheck").is_err());
        assert_eq!(SpendBucket::from_name("wants"), None);
    }

    #[test]
    fn test_buckets_hit_codes() {
        for code in ["S", "N", "W", "SNW"] {
            assert_eq!(BucketsHit::parse(code).unwrap().code(), code);
        }
        assert!(BucketsHit::parse("SN").is_none());
    }

    #[test]
    fn test_balances_credit_and_total() {
        let mut balances = Balances::new(
            Money::from_dollars(100),
            Money::from_dollars(100),
            Money::from_dollars(100),
        );
        assert_eq!(balances.total, Money::from_dollars(300));

        balances.credit(SpendBucket::Wants, Money::from_cents(-2550));
        assert!(!balances.is_consistent());

        balances.recompute_total();
        assert!(balances.is_consistent());
        assert_eq!(balances.total, Money::from_cents(27450));
    }

    #[test]
    fn test_record_round_trip_keeps_optional_fields_absent() {
        let record = BucketRecord::new("Savings", Money::from_dollars(5));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"Savings","amount":5.0}"#);
    }

    #[test]
    fn test_record_parses_split() {
        let json = r#"{"name": "Paycheck", "amount": 0,
                       "patterns": ["ACME PAYROLL"],
                       "split": {"Savings": 0.3, "Needs": 0.6, "Wants": 0.1}}"#;
        let record: BucketRecord = serde_json::from_str(json).unwrap();
        let split = record.split.unwrap();
        assert_eq!(split["Needs"], Decimal::new(6, 1));
        assert_eq!(record.patterns.unwrap(), vec!["ACME PAYROLL".to_string()]);
    }
}
