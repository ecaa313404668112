//! Transfer and withdraw services
//!
//! Moves money between spendable buckets or takes it out of one. The balance
//! arithmetic is pure; the services wrap it with the lock, a backup, the
//! activity log and the audit trail. Every check runs before the backup so a
//! rejected command leaves no trace.

use crate::audit::{AuditEntry, Operation};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Balances, Money, SpendBucket};
use crate::storage::{now_timestamp, Storage, TransferRecord, WithdrawRecord};

fn require_positive(amount: Money) -> LedgerResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(format!(
            "{} must be greater than zero",
            amount
        )))
    }
}

fn require_funds(balances: &Balances, bucket: SpendBucket, amount: Money) -> LedgerResult<()> {
    let available = balances.get(bucket);
    if available < amount {
        return Err(LedgerError::InsufficientFunds {
            bucket: bucket.name().to_string(),
            needed: amount,
            available,
        });
    }
    Ok(())
}

/// Move `amount` from one bucket to another
pub fn apply_transfer(
    balances: &Balances,
    from: SpendBucket,
    to: SpendBucket,
    amount: Money,
) -> LedgerResult<Balances> {
    if from == to {
        return Err(LedgerError::SameBucket(from.name().to_string()));
    }
    require_positive(amount)?;
    require_funds(balances, from, amount)?;

    let mut after = *balances;
    after.credit(from, -amount);
    after.credit(to, amount);
    after.recompute_total();
    Ok(after)
}

/// Take `amount` out of a bucket
pub fn apply_withdraw(balances: &Balances, bucket: SpendBucket, amount: Money) -> LedgerResult<Balances> {
    require_positive(amount)?;
    require_funds(balances, bucket, amount)?;

    let mut after = *balances;
    after.credit(bucket, -amount);
    after.recompute_total();
    Ok(after)
}

/// Balances around a committed command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceChange {
    pub before: Balances,
    pub after: Balances,
}

/// Service for transfers and withdrawals
pub struct TransferService<'a> {
    storage: &'a Storage,
}

impl<'a> TransferService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Move money between two buckets given by name
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Money,
        reason: &str,
    ) -> LedgerResult<BalanceChange> {
        let from = SpendBucket::parse(from)?;
        let to = SpendBucket::parse(to)?;

        let _lock = self.storage.lock()?;
        let mut book = self.storage.buckets.load()?;
        let before = book.balances();
        let after = apply_transfer(&before, from, to, amount)?;

        self.storage.backup_before("transfer")?;
        book.set_balances(&after);
        self.storage.buckets.save(&book)?;
        self.storage.transfers.append(&TransferRecord {
            timestamp: now_timestamp(),
            from,
            to,
            amount,
            reason: reason.to_string(),
        })?;
        self.storage.log_audit(&AuditEntry::balance_change(
            Operation::Transfer,
            format!("{} -> {} {} ({})", from, to, amount.to_plain_string(), reason),
            before,
            after,
        ))?;

        log::info!("transferred {} from {} to {}", amount, from, to);
        Ok(BalanceChange { before, after })
    }

    /// Take money out of a bucket given by name
    pub fn withdraw(&self, bucket: &str, amount: Money, reason: &str) -> LedgerResult<BalanceChange> {
        let bucket = SpendBucket::parse(bucket)?;

        let _lock = self.storage.lock()?;
        let mut book = self.storage.buckets.load()?;
        let before = book.balances();
        let after = apply_withdraw(&before, bucket, amount)?;

        self.storage.backup_before("withdraw")?;
        book.set_balances(&after);
        self.storage.buckets.save(&book)?;
        self.storage.withdrawals.append(&WithdrawRecord {
            timestamp: now_timestamp(),
            bucket,
            amount,
            reason: reason.to_string(),
        })?;
        self.storage.log_audit(&AuditEntry::balance_change(
            Operation::Withdraw,
            format!("{} {} ({})", bucket, amount.to_plain_string(), reason),
            before,
            after,
        ))?;

        log::info!("withdrew {} from {}", amount, bucket);
        Ok(BalanceChange { before, after })
    }
}
