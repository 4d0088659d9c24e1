// src/store/csv.rs

//! Flat sink: an append-only CSV log with a fixed column header.
//!
//! Every record lands here in the same field order as the relational sink,
//! with the type tag spelled out per row. Nulls are empty fields; booleans
//! are `1`/`0` to match what SQLite stores.

use std::fs::File;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::PostRecord;

/// Column header, written exactly once per store.
pub const HEADER: [&str; 8] = [
    "post_type",
    "post_id",
    "date",
    "notes",
    "tags",
    "is_reblog",
    "data_1",
    "data_2",
];

/// CSV sink holding one open writer for the whole run.
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Create a fresh log at `path` and write the header row.
    pub fn open(path: &Path) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| AppError::store(format!("can't create log {:?}: {e}", path)))?;
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    /// Append one row for a record.
    pub fn append(&mut self, record: &PostRecord) -> Result<()> {
        let (data_1, data_2) = record.kind.payload();
        let row = [
            record.post_type().as_str().to_string(),
            record.id.to_string(),
            record.date.clone(),
            record.notes.to_string(),
            record.tags_joined(),
            (record.is_reblog as u8).to_string(),
            data_1.unwrap_or_default(),
            data_2.unwrap_or_default(),
        ];
        self.writer.write_record(&row)?;
        Ok(())
    }

    /// Flush and close the log.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
