//! Categorization rules
//!
//! A `RuleSet` is built once from the bucket records and never mutated while
//! transactions are categorized. Split rules are consulted before simple rules;
//! within each kind the bucket-file order is kept.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use super::bucket::{BucketRecord, SpendBucket};

/// Case-insensitive substring search against any pattern
pub fn matches_any(description: &str, patterns: &[String]) -> bool {
    let text = description.to_lowercase();
    patterns
        .iter()
        .filter(|p| !p.trim().is_empty())
        .any(|p| text.contains(&p.to_lowercase()))
}

/// A single categorization rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Splits a positive matching amount across several buckets
    Split {
        name: String,
        patterns: Vec<String>,
        shares: Vec<(String, Decimal)>,
    },
    /// Routes the full amount to one bucket
    Simple {
        bucket: SpendBucket,
        patterns: Vec<String>,
    },
}

impl Rule {
    pub fn patterns(&self) -> &[String] {
        match self {
            Rule::Split { patterns, .. } | Rule::Simple { patterns, .. } => patterns,
        }
    }

    pub fn matches(&self, description: &str) -> bool {
        matches_any(description, self.patterns())
    }
}

/// Ordered, immutable set of rules plus the bucket names they may refer to
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    known_buckets: BTreeSet<String>,
}

impl RuleSet {
    /// Build the rule set from bucket records in file order
    ///
    /// Records are expected to be validated already (see `BucketBook`).
    pub fn from_records(records: &[BucketRecord]) -> Self {
        let mut splits = Vec::new();
        let mut simple = Vec::new();

        for record in records {
            let patterns = record.pattern_list().to_vec();
            if let Some(split) = &record.split {
                splits.push(Rule::Split {
                    name: record.name.clone(),
                    patterns,
                    shares: split.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                });
            } else if let Some(bucket) = record.spend_bucket() {
                simple.push(Rule::Simple { bucket, patterns });
            }
        }

        splits.extend(simple);

        Self {
            rules: splits,
            known_buckets: records.iter().map(|r| r.name.clone()).collect(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether a bucket with this exact name exists in the store
    pub fn knows(&self, name: &str) -> bool {
        self.known_buckets.contains(name)
    }

    pub fn split_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| matches!(r, Rule::Split { .. }))
    }

    pub fn simple_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| matches!(r, Rule::Simple { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_matches_any_is_case_insensitive() {
        let patterns = vec!["Kroger".to_string(), "WHOLE FOODS".to_string()];
        assert!(matches_any("KROGER #123 CINCINNATI", &patterns));
        assert!(matches_any("whole foods market", &patterns));
        assert!(!matches_any("Netflix", &patterns));
    }

    #[test]
    fn test_empty_patterns_never_match() {
        assert!(!matches_any("anything", &[]));
        assert!(!matches_any("anything", &["".to_string(), "  ".to_string()]));
    }

    #[test]
    fn test_split_rules_come_first() {
        let records = vec![
            BucketRecord::new("Needs", Money::zero()).with_patterns(["rent"]),
            BucketRecord::new("Savings", Money::zero()),
            BucketRecord::new("Wants", Money::zero()).with_patterns(["steam"]),
            BucketRecord::new("Total", Money::zero()),
            BucketRecord::new("Paycheck", Money::zero())
                .with_patterns(["payroll"])
                .with_split([("Savings", Decimal::ONE)]),
        ];
        let rules = RuleSet::from_records(&records);

        assert_eq!(rules.rules().len(), 4);
        assert!(matches!(rules.rules()[0], Rule::Split { .. }));
        assert!(matches!(
            rules.rules()[1],
            Rule::Simple { bucket: SpendBucket::Needs, .. }
        ));
        assert!(matches!(
            rules.rules()[3],
            Rule::Simple { bucket: SpendBucket::Wants, .. }
        ));
        assert_eq!(rules.split_rules().count(), 1);
        assert_eq!(rules.simple_rules().count(), 3);
        assert!(rules.knows("Total"));
        assert!(!rules.knows("Vacation"));
    }
}
