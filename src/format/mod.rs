//! Format-polymorphic record readers
//!
//! Each format variant turns one resource's bytes into a lazy, finite,
//! non-restartable sequence of records. Exhaustion is one-shot: a fresh
//! read requires a fresh call to [`reader_for`]. Re-reading unchanged
//! content yields an identical record sequence.
//!
//! Dispatch is a single tagged-variant match; unknown format tags never
//! reach it because [`FormatTag`] rejects them at deserialization time.

mod csv;
mod json;
mod parquet;

pub use csv::CsvReader;
pub use json::{JsonArrayReader, JsonlReader};

use crate::config::StreamSpec;
use crate::error::Result;
use crate::types::Record;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// File format of a stream's resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// Tabular-delimited text
    #[default]
    Csv,
    /// Line-delimited JSON (one object per line)
    Jsonl,
    /// JSON document with a record container (default: root-level array)
    Json,
    /// Columnar (parquet)
    Parquet,
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatTag::Csv => write!(f, "csv"),
            FormatTag::Jsonl => write!(f, "jsonl"),
            FormatTag::Json => write!(f, "json"),
            FormatTag::Parquet => write!(f, "parquet"),
        }
    }
}

/// Lazy record sequence produced by one reader call
pub type RecordIter = Box<dyn Iterator<Item = Result<Record>> + Send>;

/// Select and construct the reader variant for one resource.
///
/// `content` is the resource's full byte content as fetched through the
/// storage layer; every variant works uniformly from memory.
pub fn reader_for(spec: &StreamSpec, locator: &str, content: Bytes) -> Result<RecordIter> {
    match spec.format {
        FormatTag::Csv => Ok(Box::new(CsvReader::new(
            locator,
            content,
            &spec.csv,
            spec.chunksize,
        ))),
        FormatTag::Jsonl => Ok(Box::new(JsonlReader::new(locator, content))),
        FormatTag::Json => Ok(Box::new(JsonArrayReader::new(
            locator,
            content,
            spec.json.record_path.as_deref(),
        )?)),
        FormatTag::Parquet => {
            // columnar data is stored densely, so each file materializes whole
            let records = parquet::read_parquet(locator, content)?;
            Ok(Box::new(records.into_iter().map(Ok)))
        }
    }
}
