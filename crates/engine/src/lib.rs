//! # Engine - Driftlog file store
//!
//! The orchestrator that ties the [`config`], [`record`], [`codec`], and
//! [`query`] crates into a complete file-backed log store: an append-only
//! flat file of encoded records, queried by streaming the file through a
//! fixed pipeline without ever materializing it in memory.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌─────────────────────────────────────────────────┐
//! │                  FILE STORE                     │
//! │                                                 │
//! │ write.rs → encode → append(line + CRLF)         │
//! │            (no read-side state touched)         │
//! │                                                 │
//! │ read.rs  → [count pass, last-N only]            │
//! │          → chunk → scanner → decoder            │
//! │                  → predicate → window → sink    │
//! │            (stream.rs drives one pass lazily)   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                              |
//! |--------------|------------------------------------------------------|
//! | [`lib.rs`]   | `FileStore` struct, constructor, accessors, `Debug`  |
//! | [`write`]    | `add()` append path, `del()` documented no-op        |
//! | [`read`]     | `get()`, `count()`, `stream()`, two-pass last-N      |
//! | [`stream`]   | `LogStream`: lazy pull iterator over one query pass  |
//!
//! ## Consistency model
//!
//! One pass reads the file forward in configurable chunks; each chunk is
//! fully pushed through scanner → decoder → predicate → window before the
//! next is read, so memory stays O(chunk + largest record) and record order
//! is exactly file order. Writes take no lock: an in-flight query may
//! observe records appended behind it if they land before the read cursor,
//! and concurrent writers from separate processes may interleave
//! non-atomically. Neither is detected nor repaired here.

mod read;
mod stream;
mod write;

pub use stream::LogStream;

use anyhow::Result;
use config::StoreConfig;
use std::path::PathBuf;

/// File-backed log store for one configured log file.
///
/// Construction is cheap: the directory is created, nothing is read. All
/// settings except the read chunk size are immutable for the lifetime of
/// the store, so the on-disk format cannot drift between operations.
pub struct FileStore {
    pub(crate) config: StoreConfig,
    /// Read chunk size in bytes; mutable for tests that need to force
    /// records across chunk boundaries.
    pub(crate) chunk_size: usize,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("file", &self.file_path())
            .field("format", &self.config.format)
            .field("field_separator", &self.config.field_separator)
            .field("decode_policy", &self.config.decode_policy)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl FileStore {
    /// Creates a store over `config`, creating the target directory if it
    /// does not exist. The log file itself is created lazily by the first
    /// [`add`](Self::add).
    pub fn new(config: StoreConfig) -> Result<Self> {
        anyhow::ensure!(config.chunk_size > 0, "chunk size must be non-zero");
        std::fs::create_dir_all(&config.dir)?;
        tracing::debug!(
            file = %config.file_path().display(),
            format = %config.format,
            "opened file store"
        );
        let chunk_size = config.chunk_size;
        Ok(Self { config, chunk_size })
    }

    /// The store's configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Full path of the log file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.config.file_path()
    }

    /// Current read chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overrides the read chunk size. Values below 1 are clamped to 1.
    /// Useful for tests that exercise chunk-boundary behavior.
    pub fn set_chunk_size(&mut self, bytes: usize) {
        self.chunk_size = bytes.max(1);
    }
}

#[cfg(test)]
mod tests;
