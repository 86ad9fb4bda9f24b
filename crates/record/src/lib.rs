//! # Record - Driftlog data model
//!
//! The normalized log record every backend consumes, plus the shaping that
//! happens before a record reaches storage: severity coercion, id
//! generation, and builder-style population of the optional fields.
//!
//! A record is assigned its `id` and `posted` timestamp exactly once, at
//! creation. The store never reassigns either; id uniqueness is the
//! writer's responsibility. Records are appended in creation order, so a
//! record's physical position in the file is a valid total-order surrogate
//! for `posted` — readers rely on that instead of sorting.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, lowercase on the wire.
///
/// Anything that is not one of the five known names coerces to [`Other`]
/// rather than failing — callers routinely pass free-form type strings.
///
/// [`Other`]: LogType::Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Info,
    Warning,
    Error,
    Debug,
    #[default]
    Other,
}

impl LogType {
    /// Wire spelling of this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Info => "info",
            LogType::Warning => "warning",
            LogType::Error => "error",
            LogType::Debug => "debug",
            LogType::Other => "other",
        }
    }

    /// Lenient parse: unknown names become [`LogType::Other`].
    #[must_use]
    pub fn coerce(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = UnknownLogType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(LogType::Info),
            "warning" => Ok(LogType::Warning),
            "error" => Ok(LogType::Error),
            "debug" => Ok(LogType::Debug),
            "other" => Ok(LogType::Other),
            _ => Err(UnknownLogType),
        }
    }
}

/// Error for the strict [`FromStr`] parse of [`LogType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownLogType;

impl fmt::Display for UnknownLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown log type")
    }
}

impl std::error::Error for UnknownLogType {}

/// One normalized log record.
///
/// All text fields default to empty strings rather than `None`: the flat
/// file formats have no way to distinguish a missing field from an empty
/// one, so the model does not either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// The log message itself.
    pub log: String,
    /// Free-form annotation.
    pub comment: String,
    /// Originating system or subsystem.
    pub system: String,
    /// User the record is attributed to.
    pub user: String,
    /// Wall-clock time at creation, RFC 3339 on the wire.
    pub posted: DateTime<Utc>,
    /// Severity. Serialized under the key `type`.
    #[serde(rename = "type")]
    pub kind: LogType,
    /// Application-defined code.
    pub code: String,
    /// Writer-assigned identifier, set once at creation.
    pub id: String,
}

impl LogRecord {
    /// Creates a fully-populated record: fresh id, `posted` = now, empty
    /// optional fields.
    ///
    /// `posted` is truncated to millisecond precision so the record is
    /// equal to what any format reads back; the flat encodings store
    /// exactly [`posted_str`].
    ///
    /// [`posted_str`]: LogRecord::posted_str
    pub fn new(message: impl Into<String>, kind: LogType) -> Self {
        Self {
            log: message.into(),
            comment: String::new(),
            system: String::new(),
            user: String::new(),
            posted: now_millis(),
            kind,
            code: String::new(),
            id: generate_id(),
        }
    }

    /// Sets the comment field.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets the system field.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    /// Sets the user field.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Sets the code field.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the generated id. Uniqueness stays the caller's problem.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// `posted` in the wire form used by every format: RFC 3339 with
    /// millisecond precision, `Z` suffix.
    #[must_use]
    pub fn posted_str(&self) -> String {
        self.posted.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Human-oriented single-line rendering; this is the stored form in the
/// Opaque format and is deliberately not machine-readable.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.posted_str(),
            self.kind,
            self.id,
            self.log
        )
    }
}

/// Current wall-clock time truncated to millisecond precision, the same
/// resolution every stored form carries.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Length of the random prefix of a generated id.
const ID_PREFIX_LEN: usize = 5;

/// Generates a record id: 5 alphanumeric characters, a dash, and the
/// current unix-epoch milliseconds (`k3Rx9-1735689600000`).
///
/// The millisecond suffix makes collisions unlikely but not impossible;
/// callers needing hard uniqueness must supply their own ids via
/// [`LogRecord::with_id`].
#[must_use]
pub fn generate_id() -> String {
    let prefix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_PREFIX_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}
