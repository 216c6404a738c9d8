//! Tagged cell values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use super::types::ColumnType;

/// Numbers that can be a `YYYYMMDD` date.
const COMPACT_DATE_RANGE: std::ops::RangeInclusive<f64> = 10_000_101.0..=99_991_231.0;

/// Date formats accepted when coercing text to a date.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Date-time formats whose date part is kept when coercing text to a date.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A single table cell.
///
/// `Missing` compares equal to itself, so two rows with missing cells in the
/// same positions are duplicates of each other.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Floating-point number. NaN is never stored; see [`Value::number`].
    Number(f64),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Boolean value.
    Bool(bool),
    /// Absent or unparseable value.
    #[default]
    Missing,
}

impl Value {
    /// Create a number, mapping non-finite results to `Missing`.
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Missing
        }
    }

    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Returns true if this cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// The type tag of this cell.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Number(_) => ColumnType::Number,
            Value::Text(_) => ColumnType::Text,
            Value::Date(_) => ColumnType::Date,
            Value::Bool(_) => ColumnType::Boolean,
            Value::Missing => ColumnType::Missing,
        }
    }

    /// Numeric view of a `Number` cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of a `Text` cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Date view of a `Date` cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Convert to a number. Unconvertible values become `Missing`.
    pub fn to_number(&self) -> Value {
        match self {
            Value::Number(_) => self.clone(),
            Value::Text(s) => parse_number(s).map(Value::number).unwrap_or(Value::Missing),
            Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
            Value::Date(_) | Value::Missing => Value::Missing,
        }
    }

    /// Convert to a date. Unconvertible values become `Missing`.
    ///
    /// Eight-digit integers are read as compact `YYYYMMDD` dates.
    pub fn to_date(&self) -> Value {
        let parsed = match self {
            Value::Date(_) => return self.clone(),
            Value::Text(s) => parse_date(s),
            Value::Number(n) if n.fract() == 0.0 && COMPACT_DATE_RANGE.contains(n) => {
                parse_date(&format!("{}", *n as i64))
            }
            Value::Number(_) | Value::Bool(_) | Value::Missing => None,
        };
        parsed.map(Value::Date).unwrap_or(Value::Missing)
    }

    /// Compare two cells of the same type.
    ///
    /// Returns `None` when either side is missing or the types differ.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Rank used to order cells of different types in sort keys.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Date(_) => 2,
            Value::Text(_) => 3,
            Value::Missing => 4,
        }
    }
}

/// Parse a number, tolerating surrounding whitespace.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date from the common textual formats.
///
/// Date-time strings are accepted and truncated to their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order for grouping and sorting: values order naturally within a
/// type, types order as bool < number < date < text, and missing sorts last.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b))
            }
            (Value::Missing, Value::Missing) => Ordering::Equal,
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank())),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Number(n) => {
                // 0.0 and -0.0 compare equal and must hash equal.
                let n = if *n == 0.0 { 0.0 } else { *n };
                n.to_bits().hash(state);
            }
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}
