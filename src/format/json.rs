//! Line-delimited and document JSON readers

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use bytes::Bytes;
use std::collections::VecDeque;

// ============================================================================
// JSONL
// ============================================================================

/// Line-delimited JSON reader: each non-blank line is one record.
///
/// A malformed or non-object line is a fatal decode error for the resource,
/// not a skip.
pub struct JsonlReader {
    locator: String,
    lines: VecDeque<(usize, String)>,
}

impl JsonlReader {
    /// Build a reader over one resource's content
    pub fn new(locator: &str, content: Bytes) -> Self {
        let text = String::from_utf8_lossy(&content);
        let lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line.to_string()))
            .collect();
        Self {
            locator: locator.to_string(),
            lines,
        }
    }
}

impl Iterator for JsonlReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line_no, line) = self.lines.pop_front()?;
        let parsed: std::result::Result<JsonValue, _> = serde_json::from_str(line.trim());
        Some(match parsed {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(_) => Err(Error::decode(
                &self.locator,
                format!("line {line_no}: expected a JSON object"),
            )),
            Err(e) => Err(Error::decode(
                &self.locator,
                format!("line {line_no}: {e}"),
            )),
        })
    }
}

// ============================================================================
// JSON document
// ============================================================================

/// Reader over a JSON document's record container.
///
/// The container is located by a dot-notation path (default: the root-level
/// array); non-object items are wrapped as `{"value": item}` so every
/// emitted unit is a mapping. The document is parsed from the in-memory
/// content once; record emission stays lazy over the extracted items.
pub struct JsonArrayReader {
    items: std::vec::IntoIter<JsonValue>,
}

impl JsonArrayReader {
    /// Parse one resource's content and locate its record container
    pub fn new(locator: &str, content: Bytes, record_path: Option<&str>) -> Result<Self> {
        let document: JsonValue = serde_json::from_slice(&content)
            .map_err(|e| Error::decode(locator, e.to_string()))?;
        let items = extract_records(&document, record_path)?;
        Ok(Self {
            items: items.into_iter(),
        })
    }
}

impl Iterator for JsonArrayReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        Some(Ok(match item {
            JsonValue::Object(map) => map,
            other => {
                let mut wrapped = Record::new();
                wrapped.insert("value".to_string(), other);
                wrapped
            }
        }))
    }
}

/// Extract the record container from a parsed document
fn extract_records(value: &JsonValue, record_path: Option<&str>) -> Result<Vec<JsonValue>> {
    match record_path {
        Some(path) => {
            // jsonpath only for wildcard patterns; dot notation handles the rest
            if path.contains('*') && !path.contains("[-") {
                extract_with_jsonpath(value, path)
            } else {
                match extract_simple_path(value, path) {
                    Some(JsonValue::Array(arr)) => Ok(arr),
                    Some(v) => Ok(vec![v]),
                    None => Ok(vec![]),
                }
            }
        }
        None => match value {
            JsonValue::Array(arr) => Ok(arr.clone()),
            _ => Ok(vec![value.clone()]),
        },
    }
}

/// Extract a value using simple dot-notation path
fn extract_simple_path(value: &JsonValue, path: &str) -> Option<JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let parts: Vec<&str> = path.split('.').collect();

    let mut current = value;
    for part in parts {
        // Handle array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = &part[bracket_pos + 1..part.len() - 1];

            if !name.is_empty() {
                current = current.get(name)?;
            }

            if index_str == "*" {
                return Some(current.clone());
            } else if let Ok(index) = index_str.parse::<i64>() {
                if let JsonValue::Array(arr) = current {
                    #[allow(clippy::cast_possible_wrap)]
                    let idx = if index < 0 {
                        (arr.len() as i64 + index) as usize
                    } else {
                        index as usize
                    };
                    current = arr.get(idx)?;
                } else {
                    return None;
                }
            } else {
                return None;
            }
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &JsonValue, path: &str) -> Result<Vec<JsonValue>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath: {e}"),
    })?;

    let result = jp.find(value);

    match result {
        JsonValue::Array(arr) => Ok(arr),
        JsonValue::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
