//! Categorizer and ingestion planning
//!
//! Routes each transaction to bucket(s) and plans a whole batch in memory.
//! Nothing here touches the disk: a plan either comes back complete or the
//! batch fails as a unit.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Balances, BucketsHit, HistoryEntry, Money, Rule, RuleSet, SpendBucket, TransactionRow,
};
use crate::storage::SeenTransactions;

/// Where one transaction's money goes
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub hit: BucketsHit,
    /// Rule that matched; `None` for the Wants fallback
    pub rule: Option<String>,
    pub credits: Vec<(SpendBucket, Money)>,
}

/// Applies a `RuleSet` to transactions
pub struct Categorizer<'a> {
    rules: &'a RuleSet,
}

impl<'a> Categorizer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Decide the allocation of a single row
    ///
    /// Split rules only apply to deposits; the first matching split wins,
    /// then the first matching spendable bucket, then Wants.
    pub fn categorize(&self, row: &TransactionRow) -> LedgerResult<Allocation> {
        let deposit = row.amount.is_positive();
        let mut first_simple = None;

        for rule in self.rules.rules() {
            match rule {
                Rule::Split { name, shares, .. } => {
                    if deposit && rule.matches(&row.description) {
                        return self.split(name, shares, row.amount);
                    }
                }
                Rule::Simple { bucket, .. } => {
                    if first_simple.is_none() && rule.matches(&row.description) {
                        first_simple = Some(*bucket);
                    }
                }
            }
        }

        Ok(match first_simple {
            Some(bucket) => Allocation {
                hit: BucketsHit::Single(bucket),
                rule: Some(bucket.name().to_string()),
                credits: vec![(bucket, row.amount)],
            },
            None => Allocation {
                hit: BucketsHit::Single(SpendBucket::Wants),
                rule: None,
                credits: vec![(SpendBucket::Wants, row.amount)],
            },
        })
    }

    fn split(
        &self,
        name: &str,
        shares: &[(String, rust_decimal::Decimal)],
        amount: Money,
    ) -> LedgerResult<Allocation> {
        let mut credits = Vec::with_capacity(shares.len());
        for (target, fraction) in shares {
            if !self.rules.knows(target) {
                return Err(LedgerError::UnknownBucket(target.clone()));
            }
            let bucket = SpendBucket::from_name(target)
                .ok_or_else(|| LedgerError::InvalidBucket(target.clone()))?;
            credits.push((bucket, amount.share(*fraction)));
        }

        let distributed: Money = credits.iter().map(|(_, m)| *m).sum();
        if distributed != amount {
            log::debug!(
                "split '{}' distributed {} of {}",
                name,
                distributed,
                amount
            );
        }

        Ok(Allocation {
            hit: BucketsHit::Split,
            rule: Some(name.to_string()),
            credits,
        })
    }
}

/// In-memory result of planning a batch
#[derive(Debug, Clone, PartialEq)]
pub struct IngestPlan {
    pub before: Balances,
    /// Balances after the batch, Total recomputed
    pub after: Balances,
    /// New ledger entries in application order
    pub entries: Vec<HistoryEntry>,
    /// Per-bucket sums credited by this batch; `total` is the net amount
    pub credited: Balances,
    pub rows_read: usize,
    pub duplicates: usize,
}

impl IngestPlan {
    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn net(&self) -> Money {
        self.credited.total
    }
}

/// Run the dedup gate and categorizer over a date-ordered batch
pub fn plan_batch(
    rules: &RuleSet,
    balances: Balances,
    mut seen: SeenTransactions,
    rows: Vec<TransactionRow>,
) -> LedgerResult<IngestPlan> {
    let categorizer = Categorizer::new(rules);
    let rows_read = rows.len();
    let mut after = balances;
    let mut credited = Balances::default();
    let mut entries = Vec::new();
    let mut duplicates = 0;

    for row in rows {
        if seen.take(&row.key()) {
            log::debug!("skipping processed row {} {}", row.date, row.description);
            duplicates += 1;
            continue;
        }

        let allocation = categorizer.categorize(&row)?;
        for (bucket, amount) in &allocation.credits {
            after.credit(*bucket, *amount);
            credited.credit(*bucket, *amount);
        }
        log::debug!(
            "{} {} {} -> {}",
            row.date,
            row.description,
            row.amount,
            allocation.hit
        );
        entries.push(HistoryEntry::new(row, allocation.hit));
    }

    after.recompute_total();
    credited.recompute_total();

    log::info!(
        "planned {} new row(s), {} duplicate(s), net {}",
        entries.len(),
        duplicates,
        credited.total
    );

    Ok(IngestPlan {
        before: balances,
        after,
        entries,
        credited,
        rows_read,
        duplicates,
    })
}
