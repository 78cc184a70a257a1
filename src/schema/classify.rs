//! Value type classification

use super::types::TypeTag;
use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Cheap shape check so most strings skip the chrono parse attempts
static DATETIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}(T|$)").expect("valid datetime shape regex"));

/// Classify a single value into a primitive type tag.
///
/// Total function: every value maps to a tag, unrecognized content falls
/// back to `string`. Booleans are checked before numbers so they never
/// classify as integers.
pub fn classify(value: &JsonValue) -> TypeTag {
    match value {
        JsonValue::Null => TypeTag::Null,
        JsonValue::Bool(_) => TypeTag::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() || n.is_u64() {
                TypeTag::Integer
            } else {
                TypeTag::Number
            }
        }
        JsonValue::Object(_) => TypeTag::Object,
        JsonValue::Array(_) => TypeTag::Array,
        JsonValue::String(s) => {
            if parse_iso_datetime(s).is_some() {
                TypeTag::DateTime
            } else {
                TypeTag::String
            }
        }
    }
}

/// Best-effort ISO-8601 parse, locale-agnostic.
///
/// Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM:SS[.f]`, and
/// bare `YYYY-MM-DD` dates (read as midnight UTC). Returns None instead of
/// failing; parse failures are data, not control flow.
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    if !DATETIME_SHAPE.is_match(s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
