//! Transaction source
//!
//! Loads one or two bank export CSVs, turns each line into a signed
//! `TransactionRow` and merges them into a single date-ordered batch.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::models::TransactionRow;
use crate::storage::read_table;

/// Exports processed in one ingestion
pub const MIN_INPUTS: usize = 1;
pub const MAX_INPUTS: usize = 2;

/// Reads bank exports using the configured date format
pub struct TransactionSource {
    date_format: String,
}

impl TransactionSource {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Export files in `dir`: regular `*.csv` files sorted by name
    pub fn discover(dir: &Path) -> LedgerResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(LedgerError::NotFound(dir.display().to_string()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)
            .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", dir.display(), e)))?
        {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Parse one export from any reader; `name` is used in error messages
    pub fn parse_reader<R: Read>(&self, reader: R, name: &str) -> LedgerResult<Vec<TransactionRow>> {
        let table = read_table(reader, name)?;
        table
            .named_rows()
            .enumerate()
            .map(|(idx, fields)| TransactionRow::from_fields(fields, &self.date_format, name, idx + 1))
            .collect()
    }

    /// Parse one export file
    pub fn load_file(&self, path: &Path) -> LedgerResult<Vec<TransactionRow>> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LedgerError::NotFound(path.display().to_string())
            } else {
                LedgerError::Io(format!("Failed to open {}: {}", path.display(), e))
            }
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let rows = self.parse_reader(file, &name)?;
        log::info!("read {} row(s) from {}", rows.len(), name);
        Ok(rows)
    }

    /// Load and merge 1-2 exports into one batch sorted by date
    ///
    /// Rows keep file order within a date (the sort is stable).
    pub fn load_files(&self, paths: &[PathBuf]) -> LedgerResult<Vec<TransactionRow>> {
        if !(MIN_INPUTS..=MAX_INPUTS).contains(&paths.len()) {
            return Err(LedgerError::InvalidInputCount(paths.len()));
        }

        let mut rows = Vec::new();
        for path in paths {
            rows.extend(self.load_file(path)?);
        }
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn source() -> TransactionSource {
        TransactionSource::new("%m/%d/%Y")
    }

    #[test]
    fn test_parse_debit_and_credit() {
        let csv = "Date,Description,Debit,Credit,Memo\n\
                   01/05/2025,KROGER #123,\"$1,234.56\",,weekly\n\
                   01/06/2025,ACME PAYROLL,,1000.00,\n";
        let rows = source().parse_reader(csv.as_bytes(), "checking.csv").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, Money::from_cents(-123456));
        assert_eq!(rows[0].field("Memo"), Some("weekly"));
        assert_eq!(rows[1].amount, Money::from_dollars(1000));
    }

    #[test]
    fn test_debit_sign_is_normalized() {
        let csv = "Date,Description,Debit,Credit\n01/05/2025,REFUND FIX,-20.00,\n";
        let rows = source().parse_reader(csv.as_bytes(), "a.csv").unwrap();
        assert_eq!(rows[0].amount, Money::from_dollars(-20));
    }

    #[test]
    fn test_both_amounts_empty_is_malformed() {
        let csv = "Date,Description,Debit,Credit\n01/05/2025,MYSTERY,,\n";
        let err = source().parse_reader(csv.as_bytes(), "a.csv").unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let csv = "Date,Description,Debit,Credit\n01/05/2025,OK,1.00,\n2025-01-06,BAD,1.00,\n";
        let err = source().parse_reader(csv.as_bytes(), "a.csv").unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRow { row: 2, ref file, .. } if file == "a.csv"));
    }

    #[test]
    fn test_headers_are_trimmed() {
        let csv = " Date , Description ,Debit,Credit\n01/05/2025,COFFEE,3.00,\n";
        let rows = source().parse_reader(csv.as_bytes(), "a.csv").unwrap();
        assert_eq!(rows[0].description, "COFFEE");
    }

    #[test]
    fn test_load_files_merges_and_sorts_stably() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.csv");
        let b = temp_dir.path().join("b.csv");
        fs::write(&a, "Date,Description,Debit,Credit\n01/03/2025,A-LATE,1.00,\n01/02/2025,A-SAME,1.00,\n").unwrap();
        fs::write(&b, "Date,Description,Debit,Credit\n01/02/2025,B-SAME,1.00,\n01/01/2025,B-EARLY,1.00,\n").unwrap();

        let rows = source().load_files(&[a, b]).unwrap();
        let order: Vec<_> = rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["B-EARLY", "A-SAME", "B-SAME", "A-LATE"]);
    }

    #[test]
    fn test_input_count() {
        let temp_dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| temp_dir.path().join(format!("{}.csv", i))).collect();

        assert!(matches!(source().load_files(&[]), Err(LedgerError::InvalidInputCount(0))));
        assert!(matches!(source().load_files(&paths), Err(LedgerError::InvalidInputCount(3))));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("z.CSV"), "").unwrap();
        fs::write(temp_dir.path().join("a.csv"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp_dir.path().join("dir.csv")).unwrap();

        let found = TransactionSource::discover(temp_dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "z.CSV"]);
    }
}
