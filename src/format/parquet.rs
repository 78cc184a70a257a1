//! Columnar reader

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Decode a whole parquet resource into records, in file order.
///
/// The bytes come through the storage layer's remote-capable fetch; decoding
/// materializes per file with no chunking.
pub fn read_parquet(locator: &str, content: Bytes) -> Result<Vec<Record>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(content)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let mut writer = arrow::json::LineDelimitedWriter::new(Vec::new());
        writer.write_batches(&[&batch])?;
        writer.finish()?;
        let buf = writer.into_inner();

        let text = String::from_utf8(buf)
            .map_err(|e| Error::decode(locator, format!("non-utf8 row encoding: {e}")))?;
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let value: JsonValue =
                serde_json::from_str(line).map_err(|e| Error::decode(locator, e.to_string()))?;
            match value {
                JsonValue::Object(map) => records.push(map),
                other => {
                    let mut wrapped = Record::new();
                    wrapped.insert("value".to_string(), other);
                    records.push(wrapped);
                }
            }
        }
    }

    Ok(records)
}
