//! `LogStream`: one lazy, single-consumer query pass over the log file.
//!
//! The stream owns the file handle and pulls one chunk at a time, pushing
//! it through scanner → decoder → predicate → window before the next chunk
//! is read. The consumer may stop pulling at any point; dropping the
//! stream (or exhausting the window) releases the handle.

use anyhow::{Context, Result};
use codec::{SegmentPosition, SegmentScanner};
use config::{DecodePolicy, OutputFormat};
use query::{Admit, Query, Window};
use record::LogRecord;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;

use crate::FileStore;

/// Lazy, finite, non-restartable sequence of decoded records matching one
/// query, in file order.
///
/// Yields `Err` once and then ends if a chunk read fails or a segment
/// fails to decode under [`DecodePolicy::Fail`]; with
/// [`DecodePolicy::Skip`] malformed segments are dropped silently (logged
/// at `debug`).
pub struct LogStream {
    /// `None` once the pass is over and the handle released.
    file: Option<File>,
    buf: Vec<u8>,
    scanner: SegmentScanner,
    format: OutputFormat,
    field_separator: Option<String>,
    decode_policy: DecodePolicy,
    query: Query,
    window: Window,
    /// Records decoded, matched, and admitted but not yet pulled.
    ready: VecDeque<LogRecord>,
    /// Stream index of the next segment, for brace reconstruction.
    segment_index: u64,
    /// Set once the window is exhausted or an error was yielded.
    done: bool,
}

impl LogStream {
    /// Opens the log file and prepares a pass for `query` under `window`.
    ///
    /// Fails if the file cannot be opened (a store that was never written
    /// to has no file yet).
    pub(crate) fn open(store: &FileStore, query: Query, window: Window) -> Result<Self> {
        let path = store.file_path();
        let file = File::open(&path)
            .with_context(|| format!("opening {} for query", path.display()))?;

        Ok(Self {
            file: Some(file),
            buf: vec![0u8; store.chunk_size],
            scanner: SegmentScanner::new(store.config.format),
            format: store.config.format,
            field_separator: store.config.field_separator.clone(),
            decode_policy: store.config.decode_policy,
            query,
            window,
            ready: VecDeque::new(),
            segment_index: 0,
            done: false,
        })
    }

    /// Ends the pass and releases the file handle.
    fn finish(&mut self) {
        self.done = true;
        self.file = None;
    }

    /// Decodes one segment and runs it through predicate and window.
    /// Returns `Err` only under [`DecodePolicy::Fail`]; `Ok(true)` means
    /// the pass should continue, `Ok(false)` that the window is exhausted.
    fn consume_segment(&mut self, segment: &[u8], tail: bool) -> Result<bool> {
        let position = SegmentPosition::classify(self.segment_index, tail);
        self.segment_index += 1;

        let record = match codec::decode(
            segment,
            self.format,
            self.field_separator.as_deref(),
            position,
        ) {
            Ok(record) => record,
            Err(err) => match self.decode_policy {
                DecodePolicy::Fail => {
                    return Err(err).context("malformed record aborted the query");
                }
                DecodePolicy::Skip => {
                    tracing::debug!(error = %err, "skipping undecodable segment");
                    return Ok(true);
                }
            },
        };

        if !self.query.matches(&record) {
            return Ok(true);
        }

        match self.window.admit() {
            Admit::Emit => {
                self.ready.push_back(record);
                Ok(true)
            }
            Admit::Skip => Ok(true),
            Admit::Exhausted => Ok(false),
        }
    }

    /// Reads the next chunk and feeds it through the pipeline. Returns
    /// `Ok(false)` when the file is exhausted and flushed.
    fn pump(&mut self) -> Result<bool> {
        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };

        let n = file.read(&mut self.buf).context("reading log file chunk")?;
        if n == 0 {
            // End of stream. A partial tail only means something outside
            // the Flat format: a well-formed flat file ends with CRLF, and
            // the Json format's last record keeps its closing brace past
            // the final separator.
            if let Some(tail) = self.scanner.flush() {
                if self.format != OutputFormat::Flat && !self.consume_segment(&tail, true)? {
                    self.finish();
                    return Ok(false);
                }
            }
            self.finish();
            return Ok(false);
        }

        let segments = self.scanner.feed(&self.buf[..n]);
        for segment in segments {
            if !self.consume_segment(&segment, false)? {
                // Window exhausted: physical order is final, nothing after
                // this point can enter the window. Stop reading early.
                self.finish();
                break;
            }
        }
        Ok(true)
    }
}

impl Iterator for LogStream {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            match self.pump() {
                Ok(true) => {}
                Ok(false) => {
                    // Drain whatever the flush produced on the next spin.
                    if self.ready.is_empty() {
                        return None;
                    }
                }
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl std::fmt::Debug for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("format", &self.format)
            .field("segment_index", &self.segment_index)
            .field("ready", &self.ready.len())
            .field("done", &self.done)
            .finish()
    }
}
