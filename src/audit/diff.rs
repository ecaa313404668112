//! Diff generation for audit logging
//!
//! Summarizes which balances a command changed.

use crate::models::{Balances, SpendBucket, TOTAL};

/// Generate a human-readable diff between two balance states
///
/// Lists each changed bucket as `Name: before -> after` in bucket order,
/// Total last. Returns `None` when nothing changed.
pub fn generate_diff(before: &Balances, after: &Balances) -> Option<String> {
    let mut changes: Vec<String> = SpendBucket::ALL
        .iter()
        .filter(|bucket| before.get(**bucket) != after.get(**bucket))
        .map(|bucket| {
            format!(
                "{}: {} -> {}",
                bucket.name(),
                before.get(*bucket),
                after.get(*bucket)
            )
        })
        .collect();

    if before.total != after.total {
        changes.push(format!("{}: {} -> {}", TOTAL, before.total, after.total));
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}
