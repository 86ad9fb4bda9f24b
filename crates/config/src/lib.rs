//! # Config - Driftlog store configuration
//!
//! Immutable per-store settings shared by the codec and the engine. A
//! [`StoreConfig`] is built once and handed to the engine at construction;
//! nothing in here is mutated afterwards, so a store's on-disk format can
//! never change mid-flight.
//!
//! ## Output formats
//!
//! | Format  | Record separator | Per-record layout                          |
//! |---------|------------------|--------------------------------------------|
//! | Flat    | `\r\n`           | fields joined by the field separator, or a single compact JSON line when no field separator is configured |
//! | Json    | `}\r\n{`         | one pretty-printed JSON object              |
//! | Opaque  | `\r\n`           | the record's `Display` form, not re-readable |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// On-disk encoding for one store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Field-separated single line per record (the default). Falls back to
    /// one compact JSON line per record when no field separator is set.
    #[default]
    Flat,
    /// One pretty-printed JSON object per record. Adjacent records share
    /// their braces with the `}\r\n{` separator, so raw segments need brace
    /// reconstruction on read.
    Json,
    /// The record's string form, stored verbatim. Write-only for practical
    /// purposes: segments cannot be restructured into records.
    Opaque,
}

impl OutputFormat {
    /// Byte sequence separating two stored records in this format.
    ///
    /// For `Json` the separator overlaps the closing and opening braces of
    /// adjacent objects, which is why decoded segments arrive brace-less.
    #[must_use]
    pub fn record_separator(self) -> &'static [u8] {
        match self {
            OutputFormat::Json => b"}\r\n{",
            OutputFormat::Flat | OutputFormat::Opaque => b"\r\n",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Flat => "flat",
            OutputFormat::Json => "json",
            OutputFormat::Opaque => "string",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(OutputFormat::Flat),
            "json" => Ok(OutputFormat::Json),
            "string" => Ok(OutputFormat::Opaque),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// What the query pipeline does when a segment fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Abort the in-flight query; the caller receives the decode error and
    /// no partial result set.
    #[default]
    Fail,
    /// Drop the malformed segment and keep scanning.
    Skip,
}

impl FromStr for DecodePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(DecodePolicy::Fail),
            "skip" => Ok(DecodePolicy::Skip),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Configuration errors (unrecognized format / policy names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownFormat(String),
    UnknownPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownFormat(s) => {
                write!(f, "unknown output format {s:?} (expected flat|json|string)")
            }
            ConfigError::UnknownPolicy(s) => {
                write!(f, "unknown decode policy {s:?} (expected fail|skip)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Default log file name.
pub const DEFAULT_FILE_NAME: &str = "driftlogs.txt";

/// Default read chunk size in bytes (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Immutable settings for one file-backed store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the log file (created by the engine if absent).
    pub dir: PathBuf,
    /// Log file name inside `dir`.
    pub name: String,
    /// Active encoding for this store.
    pub format: OutputFormat,
    /// Field separator for `Flat` records. `None` switches `Flat` to the
    /// one-JSON-line-per-record fallback.
    pub field_separator: Option<String>,
    /// Behavior on malformed segments during a query.
    pub decode_policy: DecodePolicy,
    /// Read chunk size in bytes. Memory use of a query is proportional to
    /// this plus the largest record, never to the file size.
    pub chunk_size: usize,
}

impl StoreConfig {
    /// A config with defaults for everything but the directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            name: DEFAULT_FILE_NAME.to_string(),
            format: OutputFormat::default(),
            field_separator: None,
            decode_policy: DecodePolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Full path of the log file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}

#[cfg(test)]
mod tests;
