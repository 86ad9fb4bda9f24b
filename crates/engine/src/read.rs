//! Read path: `get()`, `count()`, `stream()`, and the two-pass protocol
//! for `last`-N windows.
//!
//! A `last` window is defined in terms of the total match count, which a
//! forward-only stream cannot know up front. The engine therefore runs a
//! counting pass first (scanner → decoder → predicate, no window), then
//! the windowed main pass — sequentially, never concurrently. Callers that
//! already know the total can supply it via `Query::count_hint` and skip
//! the first pass.

use anyhow::Result;
use query::{Query, Window};

use crate::{FileStore, LogStream};

impl FileStore {
    /// Runs `query` and returns the matching records, materialized in file
    /// order.
    ///
    /// # Errors
    ///
    /// I/O failures and, under `DecodePolicy::Fail`, any malformed segment
    /// abort the query; no partial result set is returned.
    pub fn get(&self, query: &Query) -> Result<Vec<record::LogRecord>> {
        self.stream(query)?.collect()
    }

    /// Runs `query` lazily: the returned [`LogStream`] reads the file only
    /// as the caller pulls, and releases the file handle when dropped or
    /// exhausted. A `last`-N query still runs its counting pass eagerly,
    /// before this returns.
    pub fn stream(&self, query: &Query) -> Result<LogStream> {
        let total = match (query.last, query.count_hint) {
            (Some(_), Some(hint)) => Some(hint),
            (Some(_), None) => Some(self.count(query)?),
            (None, _) => None,
        };
        let window = Window::for_query(query, total);
        LogStream::open(self, query.clone(), window)
    }

    /// Counts the records matching `query`'s predicate, ignoring any
    /// `first`/`last` window. Honors `count_hint` without touching the
    /// file.
    pub fn count(&self, query: &Query) -> Result<u64> {
        if let Some(hint) = query.count_hint {
            return Ok(hint);
        }

        let predicate_only = Query {
            first: None,
            last: None,
            offset: 0,
            count_hint: None,
            ..query.clone()
        };
        let stream = LogStream::open(self, predicate_only, Window::all())?;

        let mut matches = 0u64;
        for record in stream {
            record?;
            matches += 1;
        }
        tracing::debug!(matches, "counting pass finished");
        Ok(matches)
    }
}
