//! Ingestion history ledger
//!
//! An append-only CSV of every processed transaction: the export's raw columns
//! followed by a `BucketsHit` column. It is the source of truth for the dedup
//! gate, so rows are only ever appended.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BucketsHit, HistoryEntry, TransactionKey, TransactionRow};

use super::csv_log::CsvLog;

/// Occurrence counts of processed transactions, consumed by the dedup gate
#[derive(Debug, Clone, Default)]
pub struct SeenTransactions {
    counts: HashMap<TransactionKey, usize>,
}

impl SeenTransactions {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut counts = HashMap::new();
        for entry in entries {
            *counts.entry(entry.key()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Consume one recorded occurrence of `key`; false when none is left
    pub fn take(&mut self, key: &TransactionKey) -> bool {
        match self.counts.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Total recorded occurrences not yet consumed
    pub fn remaining(&self) -> usize {
        self.counts.values().sum()
    }
}

/// The history ledger file
pub struct HistoryLedger {
    log: CsvLog,
    date_format: String,
}

impl HistoryLedger {
    pub fn new(path: PathBuf, date_format: impl Into<String>) -> Self {
        Self {
            log: CsvLog::new(path),
            date_format: date_format.into(),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Load every recorded entry in file order
    pub fn load_all(&self) -> LedgerResult<Vec<HistoryEntry>> {
        let table = self.log.read()?;
        let source = self.path().display().to_string();

        table
            .named_rows()
            .enumerate()
            .map(|(idx, mut fields)| -> LedgerResult<HistoryEntry> {
                let hit_pos = fields
                    .iter()
                    .position(|(k, _)| k == BucketsHit::COLUMN)
                    .ok_or_else(|| {
                        LedgerError::InvalidFormat(format!(
                            "{} has no {} column",
                            source,
                            BucketsHit::COLUMN
                        ))
                    })?;
                let (_, code) = fields.remove(hit_pos);
                let hit = BucketsHit::parse(&code).ok_or_else(|| {
                    LedgerError::InvalidFormat(format!(
                        "{} row {}: unknown {} value '{}'",
                        source,
                        idx + 1,
                        BucketsHit::COLUMN,
                        code
                    ))
                })?;

                let row = TransactionRow::from_fields(fields, &self.date_format, &source, idx + 1)
                    .map_err(|e| LedgerError::InvalidFormat(e.to_string()))?;
                Ok(HistoryEntry::new(row, hit))
            })
            .collect()
    }

    /// Dedup state for the entries currently on disk
    pub fn seen(&self) -> LedgerResult<SeenTransactions> {
        Ok(SeenTransactions::from_entries(&self.load_all()?))
    }

    pub fn len(&self) -> LedgerResult<usize> {
        self.log.row_count()
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Append a staged batch in one write
    ///
    /// A new file gets a header made of the batch's columns in first-seen
    /// order followed by `BucketsHit`.
    pub fn append(&self, entries: &[HistoryEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let (header, rows) = stage(entries);
        self.log.append(&header, &rows)
    }

    /// Fail if `append` would reject this batch
    pub fn check_append(&self, entries: &[HistoryEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let (header, rows) = stage(entries);
        self.log.check_append(&header, &rows)
    }
}

fn stage(entries: &[HistoryEntry]) -> (Vec<String>, Vec<Vec<(String, String)>>) {
    let mut header: Vec<String> = Vec::new();
    for entry in entries {
        for (name, _) in &entry.row.fields {
            if !header.contains(name) {
                header.push(name.clone());
            }
        }
    }
    header.push(BucketsHit::COLUMN.to_string());

    let rows = entries
        .iter()
        .map(|entry| {
            let mut fields = entry.row.fields.clone();
            fields.push((BucketsHit::COLUMN.to_string(), entry.hit.code().to_string()));
            fields
        })
        .collect();

    (header, rows)
}
