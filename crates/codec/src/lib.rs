//! # Codec - record encoding, boundary scanning, decoding
//!
//! Everything between a [`LogRecord`] and the bytes in the store file.
//!
//! ## Write side
//!
//! [`encode`] renders one record for the configured [`OutputFormat`]. The
//! record separator (`\r\n`) is appended by the engine, not here.
//!
//! Flat-Delimited fields are stored verbatim, with no escaping: a field
//! value that contains the configured field separator or a `\r\n` shifts
//! the field positions of that line, and the next read of it fails with
//! [`CodecError::FieldCount`]. Keeping such values out of flat-mode
//! records is the writer's responsibility; the JSON encodings have no such
//! restriction.
//!
//! ## Read side
//!
//! The file is consumed as arbitrarily-sized chunks. [`SegmentScanner`] is
//! the explicit state machine that splits the chunk stream into candidate
//! record segments at the record separator:
//!
//! ```text
//! state  = { pending: Vec<u8> }
//! feed(chunk) -> emitted segments, new pending
//! flush()     -> the final partial segment, if any
//! ```
//!
//! Memory is O(chunk + largest record), never O(file).
//!
//! ## Flat-JSON brace reconstruction
//!
//! In the `Json` format the record separator `}\r\n{` swallows the closing
//! brace of one object and the opening brace of the next, so raw segments
//! arrive brace-less. [`reassemble_json`] restores them based on where the
//! segment sat in the stream:
//!
//! ```text
//! Only      (single segment, no separator seen)   ->  as-is
//! First     (stream head, severed at a separator) ->  segment + "}"
//! Interior                                        ->  "{" + segment + "}"
//! Tail      (end-of-stream flush)                 ->  "{" + segment
//! ```

use config::OutputFormat;
use record::{LogRecord, LogType};
use std::borrow::Cow;
use thiserror::Error;

/// Errors raised while turning raw segments back into records.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Segment is not valid JSON after brace reconstruction.
    #[error("malformed json segment: {0}")]
    Json(#[from] serde_json::Error),

    /// Flat-Delimited segment did not split into exactly 8 fields.
    #[error("expected {expected} delimited fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// Flat-Delimited `posted` field is not an RFC 3339 timestamp.
    #[error("unparseable posted timestamp {0:?}")]
    Timestamp(String),

    /// Segment bytes are not valid UTF-8.
    #[error("segment is not valid utf-8")]
    Utf8(#[from] std::str::Utf8Error),

    /// The Opaque format stores records verbatim and cannot restructure
    /// them on read.
    #[error("opaque-string records cannot be decoded")]
    Opaque,
}

/// Number of positional fields in a Flat-Delimited record.
pub const FLAT_FIELD_COUNT: usize = 8;

/// Renders one record for `format`.
///
/// `Flat` with a field separator joins the fields in the fixed order
/// `[log, comment, system, user, posted, type, code, id]`. `Flat` without a
/// separator falls back to one compact JSON line, a documented fallback
/// rather than an error. `Json` is pretty-printed. `Opaque` is the
/// record's `Display` form.
///
/// Flat-Delimited output does not escape field values; see the module
/// docs for the separator constraint that implies.
#[must_use]
pub fn encode(record: &LogRecord, format: OutputFormat, field_separator: Option<&str>) -> String {
    match format {
        OutputFormat::Flat => match field_separator {
            Some(sep) => encode_flat(record, sep),
            // Compact JSON of a known-serializable struct cannot fail.
            None => serde_json::to_string(record).unwrap_or_default(),
        },
        OutputFormat::Json => serde_json::to_string_pretty(record).unwrap_or_default(),
        OutputFormat::Opaque => record.to_string(),
    }
}

fn encode_flat(record: &LogRecord, sep: &str) -> String {
    [
        record.log.as_str(),
        record.comment.as_str(),
        record.system.as_str(),
        record.user.as_str(),
        &record.posted_str(),
        record.kind.as_str(),
        record.code.as_str(),
        record.id.as_str(),
    ]
    .join(sep)
}

/// Where a raw segment sat in the stream; drives brace reconstruction for
/// the `Json` format. Irrelevant to the flat formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPosition {
    /// The only segment: end-of-stream flush with no separator ever seen.
    /// Both braces are still attached.
    Only,
    /// Head of the stream: leading `{` attached, trailing `}` consumed by
    /// the first separator.
    First,
    /// Severed at both ends by separators.
    Interior,
    /// End-of-stream flush after at least one separator: leading `{`
    /// consumed, trailing `}` (plus trailing separator bytes) attached.
    Tail,
}

impl SegmentPosition {
    /// Position of the segment with 0-based stream `index`; `tail` marks
    /// the end-of-stream flush segment.
    #[must_use]
    pub fn classify(index: u64, tail: bool) -> Self {
        match (index == 0, tail) {
            (true, true) => SegmentPosition::Only,
            (true, false) => SegmentPosition::First,
            (false, true) => SegmentPosition::Tail,
            (false, false) => SegmentPosition::Interior,
        }
    }
}

/// Restores the braces the `}\r\n{` record separator consumed.
///
/// Pure and independently testable; [`decode`] calls it for `Json`
/// segments before parsing.
#[must_use]
pub fn reassemble_json(segment: &str, position: SegmentPosition) -> Cow<'_, str> {
    match position {
        SegmentPosition::Only => Cow::Borrowed(segment),
        SegmentPosition::First => Cow::Owned(format!("{segment}}}")),
        SegmentPosition::Interior => Cow::Owned(format!("{{{segment}}}")),
        SegmentPosition::Tail => Cow::Owned(format!("{{{segment}")),
    }
}

/// Converts one raw segment into a record, per the format's reconstruction
/// rules.
///
/// # Errors
///
/// Any [`CodecError`]; for `Opaque` this is always [`CodecError::Opaque`].
pub fn decode(
    segment: &[u8],
    format: OutputFormat,
    field_separator: Option<&str>,
    position: SegmentPosition,
) -> Result<LogRecord, CodecError> {
    let text = std::str::from_utf8(segment)?;
    match format {
        OutputFormat::Flat => match field_separator {
            Some(sep) => decode_flat(text, sep),
            None => Ok(serde_json::from_str(text)?),
        },
        OutputFormat::Json => {
            let object = reassemble_json(text, position);
            Ok(serde_json::from_str(&object)?)
        }
        OutputFormat::Opaque => Err(CodecError::Opaque),
    }
}

fn decode_flat(text: &str, sep: &str) -> Result<LogRecord, CodecError> {
    let fields: Vec<&str> = text.split(sep).collect();
    if fields.len() != FLAT_FIELD_COUNT {
        return Err(CodecError::FieldCount {
            expected: FLAT_FIELD_COUNT,
            found: fields.len(),
        });
    }

    let posted = chrono::DateTime::parse_from_rfc3339(fields[4])
        .map_err(|_| CodecError::Timestamp(fields[4].to_string()))?
        .with_timezone(&chrono::Utc);

    Ok(LogRecord {
        log: fields[0].to_string(),
        comment: fields[1].to_string(),
        system: fields[2].to_string(),
        user: fields[3].to_string(),
        posted,
        kind: LogType::coerce(fields[5]),
        code: fields[6].to_string(),
        id: fields[7].to_string(),
    })
}

/// Splits a stream of chunks into record segments at the record separator,
/// carrying the partial tail across chunk boundaries.
///
/// Works on bytes so a multi-byte UTF-8 code point split across a chunk
/// boundary never breaks a segment; text validation happens in [`decode`],
/// once a segment is complete.
#[derive(Debug)]
pub struct SegmentScanner {
    separator: &'static [u8],
    pending: Vec<u8>,
    /// Leading bytes of `pending` already searched; no separator starts
    /// there. Keeps feeding linear when one record spans many chunks.
    searched: usize,
}

impl SegmentScanner {
    /// A scanner for `format`'s record separator.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            separator: format.record_separator(),
            pending: Vec::new(),
            searched: 0,
        }
    }

    /// Consumes one chunk and returns every fully-bounded segment it
    /// completes, in file order. The trailing piece after the last
    /// separator occurrence stays buffered as the new pending tail.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut segments = Vec::new();
        let mut start = 0;
        // Resume past the prefix earlier feeds already cleared. A separator
        // may still straddle the old tail, so `searched` always stops
        // `separator.len() - 1` bytes short of the buffered end.
        let mut search = self.searched;
        while let Some(at) = find_separator(&self.pending[search..], self.separator) {
            let end = search + at;
            segments.push(self.pending[start..end].to_vec());
            start = end + self.separator.len();
            search = start;
        }
        self.searched = (self.pending.len() - start).saturating_sub(self.separator.len() - 1);
        if start > 0 {
            self.pending.drain(..start);
        }

        segments
    }

    /// End-of-stream: hands back the buffered tail, if any. For the `Json`
    /// format this closes the last record (its trailing `}` never meets a
    /// separator); the flat formats discard it in the caller because a
    /// well-formed file always ends with `\r\n`.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        self.searched = 0;
        Some(std::mem::take(&mut self.pending))
    }
}

/// First occurrence of `needle` in `haystack`.
fn find_separator(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
