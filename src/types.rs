//! Common types used throughout filetap
//!
//! This module contains shared type definitions, type aliases,
//! and constants used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One extracted unit of data: a field-name-to-value mapping.
///
/// Every record is a structurally independent observation; fields may vary
/// in presence and type across records from the same stream.
pub type Record = JsonObject;

// ============================================================================
// Constants
// ============================================================================

/// Synthetic extraction-timestamp field injected by the engine when it is
/// configured as the replication key. Always populated in emitted records
/// but never listed in the schema's required fields.
pub const EXTRACTED_AT_FIELD: &str = "_sdc_extracted_at";

// ============================================================================
// Replication Method
// ============================================================================

/// Replication method for streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-extract every record on every run
    #[default]
    FullTable,
    /// Only extract records newer than the checkpointed cursor
    Incremental,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
