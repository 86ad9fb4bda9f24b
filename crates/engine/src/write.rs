//! Write path: `add()` and the `del()` no-op.
//!
//! Appends never touch read-side state. The file is opened in append mode
//! per call and the encoded record is written with a trailing CRLF in one
//! `write_all`; there is no locking, no batching, and no verification of
//! prior content. Appends racing across processes may interleave
//! non-atomically — a documented limitation of the flat-file backend.

use anyhow::{Context, Result};
use query::Query;
use record::{LogRecord, LogType};
use std::fs::OpenOptions;
use std::io::Write;

use crate::FileStore;

impl FileStore {
    /// Appends one record to the log file.
    ///
    /// The record is encoded for the configured format and written as
    /// `encoded + \r\n`. In the `Json` format the trailing CRLF combines
    /// with the braces of adjacent records to form the `}\r\n{` record
    /// separator the read side splits on.
    pub fn add(&self, record: &LogRecord) -> Result<()> {
        let line = codec::encode(
            record,
            self.config.format,
            self.config.field_separator.as_deref(),
        );

        let path = self.file_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {} for append", path.display()))?;

        let mut framed = Vec::with_capacity(line.len() + 2);
        framed.extend_from_slice(line.as_bytes());
        framed.extend_from_slice(b"\r\n");
        file.write_all(&framed)
            .with_context(|| format!("appending to {}", path.display()))?;

        tracing::debug!(id = %record.id, kind = %record.kind, "appended log record");
        Ok(())
    }

    /// Normalizes `message` into a fresh record (generated id, `posted` =
    /// now) and appends it. Returns the record as stored.
    pub fn add_message(&self, message: impl Into<String>, kind: LogType) -> Result<LogRecord> {
        let record = LogRecord::new(message, kind);
        self.add(&record)?;
        Ok(record)
    }

    /// Deletion is unsupported on the file backend: the file is strictly
    /// append-only. Always returns `Ok(0)` — an intentional no-op, not an
    /// error.
    pub fn del(&self, _query: &Query) -> Result<u64> {
        tracing::warn!("del() is a no-op on the file store; no records were removed");
        Ok(0)
    }
}
