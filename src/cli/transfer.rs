//! CLI command handlers for transfers and withdrawals

use crate::config::settings::Settings;
use crate::display::format_balance_change;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::TransferService;
use crate::storage::Storage;

fn parse_amount(amount: &str) -> LedgerResult<Money> {
    Money::parse(amount).map_err(|e| {
        LedgerError::InvalidAmount(format!(
            "'{}' is not an amount (use a format like '50' or '50.25'): {}",
            amount, e
        ))
    })
}

/// Handle the transfer command
pub fn handle_transfer_command(
    storage: &Storage,
    settings: &Settings,
    from: &str,
    to: &str,
    amount: &str,
    reason: &str,
) -> LedgerResult<()> {
    let amount = parse_amount(amount)?;
    let change = TransferService::new(storage).transfer(from, to, amount, reason)?;

    println!(
        "Transferred {} ({})",
        amount.format_with_symbol(&settings.currency_symbol),
        reason
    );
    println!(
        "{}",
        format_balance_change(&change.before, &change.after, &settings.currency_symbol)
    );
    Ok(())
}

/// Handle the withdraw command
pub fn handle_withdraw_command(
    storage: &Storage,
    settings: &Settings,
    bucket: &str,
    amount: &str,
    reason: &str,
) -> LedgerResult<()> {
    let amount = parse_amount(amount)?;
    let change = TransferService::new(storage).withdraw(bucket, amount, reason)?;

    println!(
        "Withdrew {} ({})",
        amount.format_with_symbol(&settings.currency_symbol),
        reason
    );
    println!(
        "{}",
        format_balance_change(&change.before, &change.after, &settings.currency_symbol)
    );
    Ok(())
}
