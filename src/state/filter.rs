//! Incremental record filtering

use super::cursor::CursorValue;
use crate::types::{JsonValue, Record};
use std::cmp::Ordering;
use tracing::warn;

/// Admits records whose replication-key value is strictly greater than the
/// checkpointed cursor.
///
/// Records with a missing or null key value are always admitted. This is a
/// deliberate permissive policy: rejecting them would silently stall forward
/// progress on sparse keys. A stricter treat-missing-as-smallest alternative
/// would change observable behavior and is not implemented.
#[derive(Debug, Clone)]
pub struct IncrementalFilter {
    key: String,
    cursor: Option<CursorValue>,
}

impl IncrementalFilter {
    /// Create a filter for the given replication key and prior cursor value.
    /// String cursors are coerced the same way record values are.
    pub fn new(key: impl Into<String>, cursor: Option<&JsonValue>) -> Self {
        Self {
            key: key.into(),
            cursor: cursor.and_then(CursorValue::coerce),
        }
    }

    /// The replication key this filter compares on
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a prior cursor is present (first runs admit everything)
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Decide whether a record passes the cursor threshold.
    pub fn admits(&self, record: &Record) -> bool {
        let Some(cursor) = &self.cursor else {
            return true;
        };
        let Some(value) = record.get(&self.key) else {
            return true;
        };
        let Some(coerced) = CursorValue::coerce(value) else {
            return true;
        };

        match coerced.compare(cursor) {
            Some(Ordering::Greater) => true,
            Some(_) => false,
            None => {
                warn!(
                    key = %self.key,
                    "replication key value not comparable to cursor, admitting record"
                );
                true
            }
        }
    }
}
