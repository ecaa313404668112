//! Transaction model
//!
//! A `TransactionRow` is one line of a bank export with its raw columns kept
//! verbatim. The signed amount and date are derived once when the row is
//! parsed; `TransactionKey` is the identity used by the dedup gate.

use chrono::NaiveDate;

use super::bucket::BucketsHit;
use super::money::Money;
use crate::error::{LedgerError, LedgerResult};

pub const DATE: &str = "Date";
pub const DESCRIPTION: &str = "Description";
pub const DEBIT: &str = "Debit";
pub const CREDIT: &str = "Credit";

/// A parsed export row
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub date: NaiveDate,
    pub description: String,
    /// Negative for debits, positive for credits
    pub amount: Money,
    /// All raw columns in header order
    pub fields: Vec<(String, String)>,
    /// File the row came from, for error messages
    pub source: String,
}

impl TransactionRow {
    /// Interpret raw columns as a transaction
    ///
    /// `row` is the 1-based data row number used in error messages.
    pub fn from_fields(
        fields: Vec<(String, String)>,
        date_format: &str,
        source: &str,
        row: usize,
    ) -> LedgerResult<Self> {
        let lookup = |name: &str| {
            fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.trim())
        };

        let date_str = lookup(DATE)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LedgerError::malformed(source, row, "missing Date"))?;
        let date = NaiveDate::parse_from_str(date_str, date_format).map_err(|_| {
            LedgerError::malformed(
                source,
                row,
                format!("could not parse date '{}' with format '{}'", date_str, date_format),
            )
        })?;

        let description = lookup(DESCRIPTION)
            .ok_or_else(|| LedgerError::malformed(source, row, "missing Description"))?
            .to_string();

        let debit = lookup(DEBIT).unwrap_or("");
        let credit = lookup(CREDIT).unwrap_or("");

        let amount = if !debit.is_empty() {
            -parse_currency(debit).map_err(|e| LedgerError::malformed(source, row, e))?.abs()
        } else if !credit.is_empty() {
            parse_currency(credit).map_err(|e| LedgerError::malformed(source, row, e))?.abs()
        } else {
            return Err(LedgerError::malformed(
                source,
                row,
                "both Debit and Credit are empty",
            ));
        };

        Ok(Self {
            date,
            description,
            amount,
            fields,
            source: source.to_string(),
        })
    }

    /// Raw value of a column, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Identity used for deduplication
    pub fn key(&self) -> TransactionKey {
        let mut extra: Vec<(String, String)> = self
            .fields
            .iter()
            .filter(|(k, v)| !is_core_column(k) && !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();
        extra.sort();

        TransactionKey {
            date: self.date,
            description: self.description.trim().to_string(),
            amount: self.amount,
            extra,
        }
    }
}

fn is_core_column(name: &str) -> bool {
    matches!(name, DATE | DESCRIPTION | DEBIT | CREDIT) || name == BucketsHit::COLUMN
}

/// Parse a currency string from an export ("$1,234.56", "(12.00)")
pub fn parse_currency(s: &str) -> Result<Money, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$' && *c != ',')
        .collect();

    // Parentheses mean negative (accounting format)
    let (negative, value) = if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        (true, &cleaned[1..cleaned.len() - 1])
    } else {
        (false, cleaned.as_str())
    };

    Money::parse(value)
        .map(|m| if negative { -m } else { m })
        .map_err(|e| format!("could not parse amount '{}': {}", s, e))
}

/// Composite identity of a transaction: date, description, amount and every
/// other non-empty column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub extra: Vec<(String, String)>,
}

/// A processed transaction as recorded in the history ledger
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub row: TransactionRow,
    pub hit: BucketsHit,
}

impl HistoryEntry {
    pub fn new(row: TransactionRow, hit: BucketsHit) -> Self {
        Self { row, hit }
    }

    pub fn key(&self) -> TransactionKey {
        self.row.key()
    }
}
