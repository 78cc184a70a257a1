//! Stream execution engine
//!
//! Composes path resolution, format-polymorphic reading, schema inference
//! and incremental filtering into one per-stream surface: a schema
//! descriptor plus a flat lazy sequence of records.
//!
//! One engine owns one stream's run-scoped caches (resolved paths, raw
//! tabular content). Engines are constructed fresh per run and never shared,
//! so no locking is involved anywhere on the record path.

use crate::config::{StreamSpec, TapConfig};
use crate::error::Result;
use crate::format::{self, FormatTag, RecordIter};
use crate::paths;
use crate::schema::{SchemaBuilder, SchemaDescriptor};
use crate::state::IncrementalFilter;
use crate::storage::{StorageBackend, StorageRouter};
use crate::types::{JsonValue, Record, EXTRACTED_AT_FIELD};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-stream orchestrator.
pub struct StreamEngine {
    spec: StreamSpec,
    storage: Arc<dyn StorageBackend>,
    checkpoint_interval: usize,
    /// Resolved locators, computed once per run
    cached_paths: Option<Vec<String>>,
    /// Raw tabular content, retained so chunked parsing never re-fetches
    csv_cache: HashMap<String, Bytes>,
}

impl StreamEngine {
    /// Create an engine for one stream spec
    pub fn new(spec: StreamSpec, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            spec,
            storage,
            checkpoint_interval: 10_000,
            cached_paths: None,
            csv_cache: HashMap::new(),
        }
    }

    /// Set the records-per-checkpoint hint
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Build one engine per configured stream, sharing a scheme-routing
    /// storage layer carrying the config's credential hints.
    pub fn from_config(config: &TapConfig) -> Vec<StreamEngine> {
        let storage: Arc<dyn StorageBackend> = Arc::new(StorageRouter::new(config.auth.clone()));
        config
            .streams
            .iter()
            .map(|spec| {
                StreamEngine::new(spec.clone(), Arc::clone(&storage))
                    .with_checkpoint_interval(config.state_checkpoint_interval)
            })
            .collect()
    }

    /// The stream's unique name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The stream's spec
    pub fn spec(&self) -> &StreamSpec {
        &self.spec
    }

    /// Records-per-checkpoint emission interval. An efficiency hint for the
    /// downstream protocol layer, not a correctness mechanism.
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    /// Resolve the stream's locations, caching the result for the run
    pub async fn resolve_paths(&mut self) -> Result<Vec<String>> {
        if let Some(paths) = &self.cached_paths {
            return Ok(paths.clone());
        }
        let paths = paths::resolve(&self.spec, self.storage.as_ref()).await?;
        debug!(stream = %self.spec.name, count = paths.len(), "resolved stream paths");
        self.cached_paths = Some(paths.clone());
        Ok(paths)
    }

    /// The stream's schema: an explicit override verbatim, else a
    /// descriptor inferred from sampled records.
    pub async fn schema(&mut self) -> Result<JsonValue> {
        if let Some(explicit) = &self.spec.schema {
            return Ok(explicit.clone());
        }
        Ok(self.infer_schema().await?.to_json())
    }

    /// Run schema inference over up to `infer_samples` records drawn from
    /// the raw reader pipeline in resolution order. Never fails on absent
    /// samples; zero records yield a minimal schema of synthesized fields.
    pub async fn infer_schema(&mut self) -> Result<SchemaDescriptor> {
        let limit = self.spec.infer_samples;
        let replication_key = self.spec.replication_key.clone();
        let primary_keys = self.spec.keys.clone();

        let mut builder = SchemaBuilder::new();
        {
            let mut sample = self.raw_records(Some(limit)).await?;
            while let Some(record) = sample.try_next().await? {
                builder.observe(&record);
            }
        }
        debug!(
            stream = %self.spec.name,
            samples = builder.samples(),
            "schema inference sampling complete"
        );
        Ok(builder.build(replication_key.as_deref(), &primary_keys))
    }

    /// Open the stream's record sequence for a full run.
    ///
    /// `cursor` is the prior replication-key value checkpointed by the
    /// outer protocol layer, if any. When the replication key is the
    /// synthetic extraction timestamp, every record gets it stamped with
    /// this call's wall-clock time.
    pub async fn records(&mut self, cursor: Option<&JsonValue>) -> Result<RecordStream<'_>> {
        let paths = self.resolve_paths().await?;
        let filter = self
            .spec
            .replication_key
            .clone()
            .map(|key| IncrementalFilter::new(key, cursor));
        let extracted_at = (self.spec.replication_key.as_deref() == Some(EXTRACTED_AT_FIELD))
            .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));

        Ok(RecordStream {
            engine: self,
            paths: paths.into_iter(),
            current: None,
            filter,
            extracted_at,
            limit: None,
            emitted: 0,
        })
    }

    /// Raw pipeline: resolution order, no filtering, no timestamp injection
    async fn raw_records(&mut self, limit: Option<usize>) -> Result<RecordStream<'_>> {
        let paths = self.resolve_paths().await?;
        Ok(RecordStream {
            engine: self,
            paths: paths.into_iter(),
            current: None,
            filter: None,
            extracted_at: None,
            limit,
            emitted: 0,
        })
    }

    /// Fetch one resource's content. Tabular content is cached for the
    /// run so chunked parsing costs one transport round-trip per file.
    async fn fetch_content(&mut self, locator: &str) -> Result<Bytes> {
        if self.spec.format == FormatTag::Csv {
            if let Some(content) = self.csv_cache.get(locator) {
                debug!(locator, "using cached tabular content");
                return Ok(content.clone());
            }
            let content = self.storage.read(locator).await?;
            self.csv_cache.insert(locator.to_string(), content.clone());
            return Ok(content);
        }
        self.storage.read(locator).await
    }
}

/// Lazy, pull-based record sequence over one stream's resolved resources.
///
/// Exhaustion is one-shot: a fresh sequence requires a fresh
/// [`StreamEngine::records`] call, which reopens every resource. Dropping
/// the stream cancels all upstream work; nothing is pre-fetched beyond the
/// current resource.
pub struct RecordStream<'a> {
    engine: &'a mut StreamEngine,
    paths: std::vec::IntoIter<String>,
    current: Option<RecordIter>,
    filter: Option<IncrementalFilter>,
    /// Extraction timestamp to stamp into records, when configured
    extracted_at: Option<String>,
    /// Sampling bound; None for full runs
    limit: Option<usize>,
    emitted: usize,
}

impl RecordStream<'_> {
    /// Pull the next record, or None when the sequence is exhausted.
    pub async fn try_next(&mut self) -> Result<Option<Record>> {
        loop {
            if self.limit.is_some_and(|limit| self.emitted >= limit) {
                return Ok(None);
            }

            if self.current.is_none() {
                let Some(path) = self.paths.next() else {
                    return Ok(None);
                };
                let content = self.engine.fetch_content(&path).await?;
                self.current = Some(format::reader_for(&self.engine.spec, &path, content)?);
            }

            let Some(reader) = self.current.as_mut() else {
                continue;
            };
            match reader.next() {
                None => {
                    self.current = None;
                }
                Some(Err(e)) => return Err(e),
                Some(Ok(mut record)) => {
                    if let Some(stamp) = &self.extracted_at {
                        record.insert(
                            EXTRACTED_AT_FIELD.to_string(),
                            JsonValue::String(stamp.clone()),
                        );
                    }
                    if let Some(filter) = &self.filter {
                        if !filter.admits(&record) {
                            continue;
                        }
                    }
                    self.emitted += 1;
                    return Ok(Some(record));
                }
            }
        }
    }

    /// Drain the remaining records into a vector (test and small-run helper)
    pub async fn collect_all(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.try_next().await? {
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests;
