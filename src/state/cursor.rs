//! Cursor value coercion

use crate::schema::parse_iso_datetime;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A replication-key value coerced into a comparable type.
///
/// Strings are attempted as datetimes first, then as numbers (float iff the
/// text contains a decimal point), else kept as plain strings. Coercion
/// failures fall back to the string form rather than raising.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorValue {
    Timestamp(DateTime<Utc>),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CursorValue {
    /// Coerce a record's key value. Returns None for null (and for the
    /// non-scalar kinds that have no natural ordering).
    pub fn coerce(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(CursorValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(CursorValue::Integer(i))
                } else {
                    n.as_f64().map(CursorValue::Float)
                }
            }
            JsonValue::String(s) => Some(Self::coerce_str(s)),
            JsonValue::Object(_) | JsonValue::Array(_) => None,
        }
    }

    /// Coerce a string: datetime, then numeric, then plain text.
    pub fn coerce_str(s: &str) -> Self {
        if let Some(ts) = parse_iso_datetime(s) {
            return CursorValue::Timestamp(ts);
        }
        if s.contains('.') {
            if let Ok(f) = s.parse::<f64>() {
                return CursorValue::Float(f);
            }
        } else if let Ok(i) = s.parse::<i64>() {
            return CursorValue::Integer(i);
        }
        CursorValue::Text(s.to_string())
    }

    /// Natural ordering of the coerced type. Cross-kind comparisons are
    /// undefined and return None, except integer/float which compare
    /// numerically.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (CursorValue::Timestamp(a), CursorValue::Timestamp(b)) => Some(a.cmp(b)),
            (CursorValue::Integer(a), CursorValue::Integer(b)) => Some(a.cmp(b)),
            (CursorValue::Float(a), CursorValue::Float(b)) => a.partial_cmp(b),
            (CursorValue::Integer(a), CursorValue::Float(b)) => (*a as f64).partial_cmp(b),
            (CursorValue::Float(a), CursorValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (CursorValue::Bool(a), CursorValue::Bool(b)) => Some(a.cmp(b)),
            (CursorValue::Text(a), CursorValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
