//! Tabular-delimited reader

use crate::config::CsvOptions;
use crate::error::Result;
use crate::types::{JsonValue, Record};
use bytes::Bytes;
use std::collections::VecDeque;
use tracing::warn;

/// Chunked reader over tabular-delimited content.
///
/// Raw lines are held unparsed; typed parsing happens `chunksize` rows at a
/// time so each pull bounds parse work (a soft batch unit, not a record
/// contract). Non-finite floats and missing-value markers normalize to null
/// before emission so every value survives structural serialization.
pub struct CsvReader {
    locator: String,
    headers: Vec<String>,
    delimiter: char,
    chunksize: usize,
    lines: VecDeque<String>,
    buffered: VecDeque<Record>,
}

impl CsvReader {
    /// Build a reader over one resource's content
    pub fn new(locator: &str, content: Bytes, options: &CsvOptions, chunksize: usize) -> Self {
        let text = String::from_utf8_lossy(&content);
        let mut lines: VecDeque<String> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ToString::to_string)
            .collect();

        let headers = if options.header {
            lines
                .pop_front()
                .map(|line| parse_line(&line, options.delimiter))
                .unwrap_or_default()
        } else {
            // generate positional field names from the first row's width
            lines
                .front()
                .map(|line| parse_line(line, options.delimiter).len())
                .map(|width| (0..width).map(|i| format!("column_{i}")).collect())
                .unwrap_or_default()
        };

        Self {
            locator: locator.to_string(),
            headers,
            delimiter: options.delimiter,
            chunksize: chunksize.max(1),
            lines,
            buffered: VecDeque::new(),
        }
    }

    fn refill(&mut self) {
        for _ in 0..self.chunksize {
            let Some(line) = self.lines.pop_front() else {
                break;
            };
            let fields = parse_line(&line, self.delimiter);
            let mut record = Record::new();
            for (i, header) in self.headers.iter().enumerate() {
                let raw = fields.get(i).map(String::as_str).unwrap_or_default();
                record.insert(header.clone(), parse_value(raw, &self.locator));
            }
            self.buffered.push_back(record);
        }
    }
}

impl Iterator for CsvReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffered.is_empty() {
            self.refill();
        }
        self.buffered.pop_front().map(Ok)
    }
}

/// Split one line into fields, honoring quoting and escaped quotes
fn parse_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Coerce one raw field into a typed value
fn parse_value(raw: &str, locator: &str) -> JsonValue {
    if raw.is_empty()
        || raw.eq_ignore_ascii_case("null")
        || raw.eq_ignore_ascii_case("none")
        || raw.eq_ignore_ascii_case("na")
        || raw.eq_ignore_ascii_case("n/a")
    {
        return JsonValue::Null;
    }

    if let Ok(i) = raw.parse::<i64>() {
        return JsonValue::from(i);
    }

    if let Ok(f) = raw.parse::<f64>() {
        return match serde_json::Number::from_f64(f) {
            Some(n) => JsonValue::Number(n),
            None => {
                warn!(value = raw, locator, "normalizing non-finite float to null");
                JsonValue::Null
            }
        };
    }

    match raw {
        "true" | "True" | "TRUE" => JsonValue::Bool(true),
        "false" | "False" | "FALSE" => JsonValue::Bool(false),
        _ => JsonValue::String(raw.to_string()),
    }
}
