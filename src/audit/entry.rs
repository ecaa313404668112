//! Audit entry data structures
//!
//! Defines the operations that are audited and the entry format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Balances;

use super::diff::generate_diff;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Ingest,
    Transfer,
    Withdraw,
    Sync,
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Init => write!(f, "INIT"),
            Operation::Ingest => write!(f, "INGEST"),
            Operation::Transfer => write!(f, "TRANSFER"),
            Operation::Withdraw => write!(f, "WITHDRAW"),
            Operation::Sync => write!(f, "SYNC"),
            Operation::Restore => write!(f, "RESTORE"),
        }
    }
}

/// A single audit log entry
///
/// Records one committed command with the balances before and after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Free-form description, e.g. "Needs 50.00 (groceries)"
    pub detail: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Balances>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Balances>,

    /// Human-readable diff summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Entry for a command that changed balances
    pub fn balance_change(
        operation: Operation,
        detail: impl Into<String>,
        before: Balances,
        after: Balances,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            detail: detail.into(),
            before: Some(before),
            after: Some(after),
            diff_summary: generate_diff(&before, &after),
        }
    }

    /// Entry for a command whose prior state is unknown (init, restore)
    pub fn reset(operation: Operation, detail: impl Into<String>, after: Option<Balances>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            detail: detail.into(),
            before: None,
            after,
            diff_summary: None,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.detail
        );

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    fn balances(s: i64, n: i64, w: i64) -> Balances {
        Balances::new(Money::from_dollars(s), Money::from_dollars(n), Money::from_dollars(w))
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Ingest.to_string(), "INGEST");
        assert_eq!(Operation::Withdraw.to_string(), "WITHDRAW");
    }

    #[test]
    fn test_balance_change_entry() {
        let entry = AuditEntry::balance_change(
            Operation::Withdraw,
            "Needs 50.00 (groceries)",
            balances(100, 100, 100),
            balances(100, 50, 100),
        );

        assert_eq!(entry.operation, Operation::Withdraw);
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("Needs: $100.00 -> $50.00, Total: $300.00 -> $250.00")
        );
    }

    #[test]
    fn test_serialization() {
        let entry = AuditEntry::reset(Operation::Init, "starter buckets", Some(Balances::default()));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"operation\":\"init\""));
        assert!(!json.contains("before"));

        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.operation, Operation::Init);
        assert_eq!(deserialized.after, Some(Balances::default()));
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::balance_change(
            Operation::Transfer,
            "Savings -> Wants 10.00 (trip)",
            balances(20, 0, 0),
            balances(10, 0, 10),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("TRANSFER Savings -> Wants 10.00 (trip)"));
        assert!(formatted.contains("Changes: Savings: $20.00 -> $10.00, Wants: $0.00 -> $10.00"));
    }
}
