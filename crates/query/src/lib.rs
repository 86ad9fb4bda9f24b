//! # Query - predicates and pagination windows
//!
//! The request shape a store is queried with, the per-record predicate
//! evaluator, and the pagination window state machine. Everything here is
//! pure: no I/O, no cross-record state beyond the window counters, so the
//! engine can drive it record-by-record in file order.
//!
//! ## Clause precedence
//!
//! A query carries at most one active predicate clause; when several are
//! set, `id` wins over `filters` wins over `search`. No clause means every
//! record matches.
//!
//! ## Windows
//!
//! `first`/`last` select from the sub-sequence of *matching* records, not
//! the raw file. `last` needs the total match count up front (the engine
//! obtains it with a prior counting pass), because the file can only be
//! read forward.

use record::LogRecord;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of one filter clause, wire spellings `=`, `<=`,
/// `>=`, `<>`, `<`, `>`, `in`, `nin`, `contain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Le,
    Ge,
    Ne,
    Lt,
    Gt,
    In,
    Nin,
    Contain,
}

impl CompareOp {
    /// Wire spelling of this operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::In => "in",
            CompareOp::Nin => "nin",
            CompareOp::Contain => "contain",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOp {
    type Err = UnknownCompareOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(CompareOp::Eq),
            "<=" => Ok(CompareOp::Le),
            ">=" => Ok(CompareOp::Ge),
            "<>" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            ">" => Ok(CompareOp::Gt),
            "in" => Ok(CompareOp::In),
            "nin" => Ok(CompareOp::Nin),
            "contain" => Ok(CompareOp::Contain),
            _ => Err(UnknownCompareOp),
        }
    }
}

/// Error for an unrecognized operator spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCompareOp;

impl fmt::Display for UnknownCompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown compare operator")
    }
}

impl std::error::Error for UnknownCompareOp {}

/// One field predicate; a query's `filters` list is combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Record field name (`log`, `comment`, `system`, `user`, `posted`,
    /// `type`, `code`, `id`).
    pub field: String,
    pub compare: CompareOp,
    /// Comparison operand. `in`/`nin` expect an array here.
    pub value: Value,
}

/// Id clause: a single id or a set of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdMatch {
    One(String),
    Many(Vec<String>),
}

impl IdMatch {
    fn contains(&self, id: &str) -> bool {
        match self {
            IdMatch::One(want) => want == id,
            IdMatch::Many(set) => set.iter().any(|want| want == id),
        }
    }
}

/// A complete query: at most one predicate clause plus a pagination window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Match by id (scalar or set).
    pub id: Option<IdMatch>,
    /// Invert the id clause: match every record whose id is *not* selected.
    pub exclude: bool,
    /// Field predicates, combined with logical AND.
    pub filters: Vec<FieldFilter>,
    /// Substring match against the full JSON serialization of a record.
    pub search: Option<String>,
    /// Emit the first `n` matches (after `offset` skipped ones).
    pub first: Option<u64>,
    /// Emit the last `n` matches (shifted back by `offset`). Mutually
    /// exclusive with `first`, which wins if both are set.
    pub last: Option<u64>,
    /// Number of matches to shift the window by.
    pub offset: u64,
    /// Caller-supplied total match count; spares the engine its counting
    /// pass for `last` windows.
    pub count_hint: Option<u64>,
}

impl Query {
    /// The match-everything query.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Query by a single id.
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(IdMatch::One(id.into())),
            ..Self::default()
        }
    }

    /// Query by a set of ids.
    #[must_use]
    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Some(IdMatch::Many(ids.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    /// Free-text query over the serialized record.
    #[must_use]
    pub fn by_search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Query with a single field filter.
    #[must_use]
    pub fn by_filter(field: impl Into<String>, compare: CompareOp, value: Value) -> Self {
        Self {
            filters: vec![FieldFilter {
                field: field.into(),
                compare,
                value,
            }],
            ..Self::default()
        }
    }

    /// Evaluates the predicate against one decoded record.
    ///
    /// Pagination is not considered here; that is [`Window`]'s job.
    #[must_use]
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(id) = &self.id {
            let selected = id.contains(&record.id);
            return if self.exclude { !selected } else { selected };
        }

        if !self.filters.is_empty() {
            return self.matches_filters(record);
        }

        if let Some(text) = &self.search {
            // Serialization of a plain struct cannot fail.
            let serialized = serde_json::to_string(record).unwrap_or_default();
            return serialized.contains(text.as_str());
        }

        true
    }

    fn matches_filters(&self, record: &LogRecord) -> bool {
        let fields = serde_json::to_value(record).unwrap_or_default();
        self.filters.iter().all(|filter| {
            fields
                .get(&filter.field)
                .is_some_and(|field| compare_values(field, filter.compare, &filter.value))
        })
    }
}

/// Applies one comparison between a record field and a filter operand.
///
/// Ordered comparisons work on string pairs (lexicographic — RFC 3339
/// timestamps order chronologically) and number pairs; any other pairing
/// fails the clause rather than erroring.
fn compare_values(field: &Value, op: CompareOp, operand: &Value) -> bool {
    match op {
        CompareOp::Eq => field == operand,
        CompareOp::Ne => field != operand,
        CompareOp::Le => ordering(field, operand).is_some_and(std::cmp::Ordering::is_le),
        CompareOp::Ge => ordering(field, operand).is_some_and(std::cmp::Ordering::is_ge),
        CompareOp::Lt => ordering(field, operand).is_some_and(std::cmp::Ordering::is_lt),
        CompareOp::Gt => ordering(field, operand).is_some_and(std::cmp::Ordering::is_gt),
        CompareOp::In => operand
            .as_array()
            .is_some_and(|set| set.contains(field)),
        CompareOp::Nin => operand
            .as_array()
            .is_some_and(|set| !set.contains(field)),
        CompareOp::Contain => match (field.as_str(), operand.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
    }
}

fn ordering(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

/// Verdict of the window for one matching record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admit {
    /// Inside the window: emit the record.
    Emit,
    /// Before the window: drop the record, keep scanning.
    Skip,
    /// The window can never emit again; the caller may stop reading.
    Exhausted,
}

/// Pagination window over the stream of predicate-matching records.
///
/// [`admit`] is called once per match, in file order. `first` counts
/// forward past `offset` skipped matches; `last` positions a window at
/// match ordinals `(total - last - offset, total - offset]` using the
/// precomputed total.
///
/// [`admit`]: Window::admit
#[derive(Debug, Clone)]
pub struct Window {
    mode: Mode,
    offset: u64,
    skipped: u64,
    taken: u64,
    seen: u64,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    All,
    First(u64),
    Last { last: u64, total: u64 },
}

impl Window {
    /// A window that emits every match.
    #[must_use]
    pub fn all() -> Self {
        Self::new(Mode::All, 0)
    }

    /// First `n` matches after skipping `offset` of them.
    #[must_use]
    pub fn first(n: u64, offset: u64) -> Self {
        Self::new(Mode::First(n), offset)
    }

    /// Last `n` matches, shifted back by `offset`, out of `total` matches
    /// overall. `total` comes from a prior counting pass (or a caller
    /// hint); with `total == 0` the window never emits.
    #[must_use]
    pub fn last(n: u64, offset: u64, total: u64) -> Self {
        Self::new(Mode::Last { last: n, total }, offset)
    }

    /// Window for `query`, given the total match count when a `last`
    /// window needs one.
    ///
    /// A `last` query without a total cannot be positioned; it degrades to
    /// the all-emitting window. The engine counts first, so it never takes
    /// that path.
    #[must_use]
    pub fn for_query(query: &Query, total: Option<u64>) -> Self {
        if let Some(n) = query.first {
            Self::first(n, query.offset)
        } else if let (Some(n), Some(total)) = (query.last, total) {
            Self::last(n, query.offset, total)
        } else {
            Self::all()
        }
    }

    fn new(mode: Mode, offset: u64) -> Self {
        Self {
            mode,
            offset,
            skipped: 0,
            taken: 0,
            seen: 0,
        }
    }

    /// Decides the fate of the next matching record.
    pub fn admit(&mut self) -> Admit {
        match self.mode {
            Mode::All => Admit::Emit,
            Mode::First(n) => {
                if self.taken >= n {
                    return Admit::Exhausted;
                }
                if self.skipped < self.offset {
                    self.skipped += 1;
                    return Admit::Skip;
                }
                self.taken += 1;
                Admit::Emit
            }
            Mode::Last { last, total } => {
                if total == 0 {
                    return Admit::Exhausted;
                }
                let end = total.saturating_sub(self.offset);
                let start = end.saturating_sub(last);
                self.seen += 1;
                if self.seen > end {
                    Admit::Exhausted
                } else if self.seen > start {
                    Admit::Emit
                } else {
                    Admit::Skip
                }
            }
        }
    }
}
