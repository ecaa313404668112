//! Append-only CSV files
//!
//! Every ledger and activity log is a CSV file with a header row written on
//! first use. `CsvLog::append` takes a whole staged batch and writes it through
//! one handle, so a batch is laid out against a single header and the header
//! is never written twice.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{LedgerError, LedgerResult};

/// Contents of a CSV log: header plus data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Rows as ordered (column, value) pairs; empty header names are dropped
    pub fn named_rows(&self) -> impl Iterator<Item = Vec<(String, String)>> + '_ {
        self.rows.iter().map(move |record| {
            self.header
                .iter()
                .zip(record.iter())
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect()
        })
    }
}

/// Handle on an append-only CSV file
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file exists and has content
    pub fn has_content(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    /// Read the whole file; a missing or empty file yields an empty table
    pub fn read(&self) -> LedgerResult<CsvTable> {
        if !self.has_content() {
            return Ok(CsvTable::default());
        }

        let file = File::open(&self.path).map_err(|e| {
            LedgerError::Io(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        read_table(file, &self.path.display().to_string())
    }

    /// Header of the existing file, if any
    pub fn header(&self) -> LedgerResult<Option<Vec<String>>> {
        if !self.has_content() {
            return Ok(None);
        }
        let file = File::open(&self.path).map_err(|e| {
            LedgerError::Io(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let header = reader
            .headers()
            .map_err(|e| LedgerError::InvalidFormat(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(header.iter().map(|h| h.trim().to_string()).collect()))
    }

    /// Check that `append` would accept these rows, without writing
    pub fn check_append(&self, new_header: &[String], rows: &[Vec<(String, String)>]) -> LedgerResult<()> {
        self.layout(new_header, rows).map(|_| ())
    }

    /// Lay rows out by the file's header (or `new_header` for a new file)
    fn layout(
        &self,
        new_header: &[String],
        rows: &[Vec<(String, String)>],
    ) -> LedgerResult<(bool, Vec<String>, Vec<Vec<String>>)> {
        let existing = self.header()?;
        let has_header = existing.is_some();
        let header: Vec<String> = existing.unwrap_or_else(|| new_header.to_vec());

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some((name, _)) = row
                .iter()
                .find(|(name, value)| !header.contains(name) && !value.is_empty())
            {
                return Err(LedgerError::InvalidFormat(format!(
                    "column '{}' is not in the header of {}",
                    name,
                    self.path.display()
                )));
            }
            let record: Vec<String> = header
                .iter()
                .map(|col| {
                    row.iter()
                        .find(|(name, _)| name == col)
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default()
                })
                .collect();
            records.push(record);
        }

        Ok((has_header, header, records))
    }

    /// Append rows given as (column, value) pairs
    ///
    /// When the file is new, `new_header` is written first. When it already
    /// has a header, each row is laid out by that header; a column the header
    /// lacks is an error and nothing is written.
    pub fn append(
        &self,
        new_header: &[String],
        rows: &[Vec<(String, String)>],
    ) -> LedgerResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let (has_header, header, records) = self.layout(new_header, rows)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Stage the whole batch so a failure leaves the file untouched
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        if !has_header {
            writer.write_record(&header)?;
        }
        for record in &records {
            writer.write_record(record)?;
        }
        let staged = writer
            .into_inner()
            .map_err(|e| LedgerError::Csv(format!("Failed to stage rows: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LedgerError::Io(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        if has_header && !ends_with_newline(&self.path)? {
            file.write_all(b"\n")?;
        }
        file.write_all(&staged)?;
        file.flush()?;
        file.sync_all()?;

        log::debug!("appended {} row(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Append rows to a log with a fixed header
    pub fn append_records(&self, header: &[&str], rows: &[Vec<String>]) -> LedgerResult<()> {
        let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        let named: Vec<Vec<(String, String)>> = rows
            .iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect();
        self.append(&header, &named)
    }

    /// Number of data rows
    pub fn row_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.rows.len())
    }
}

/// Parse CSV text with a header row
pub fn read_table<R: std::io::Read>(reader: R, name: &str) -> LedgerResult<CsvTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| LedgerError::InvalidFormat(format!("{}: {}", name, e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| LedgerError::InvalidFormat(format!("{}: {}", name, e)))?;
        // Blank lines are not rows
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record);
    }

    Ok(CsvTable { header, rows })
}

fn ends_with_newline(path: &Path) -> LedgerResult<bool> {
    let contents = std::fs::read(path)?;
    Ok(contents.last().map_or(true, |b| *b == b'\n'))
}
