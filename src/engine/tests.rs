//! Engine orchestration tests

use super::*;
use crate::error::Error;
use crate::storage::DirEntry;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory storage that counts capability calls
#[derive(Default)]
struct MemoryStorage {
    files: HashMap<String, Bytes>,
    reads: AtomicUsize,
    globs: AtomicUsize,
}

impl MemoryStorage {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), Bytes::from(content.to_string()));
        self
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn globs(&self) -> usize {
        self.globs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn read(&self, locator: &str) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(locator)
            .cloned()
            .ok_or_else(|| Error::storage(format!("no such file '{locator}'")))
    }

    async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.globs.fetch_add(1, Ordering::SeqCst);
        let regex = crate::storage::glob_to_regex(pattern)?;
        Ok(self
            .files
            .keys()
            .filter(|path| regex.is_match(path))
            .cloned()
            .collect())
    }

    async fn list_dir(&self, uri: &str) -> Result<Vec<DirEntry>> {
        let prefix = format!("{}/", uri.trim_end_matches('/'));
        Ok(self
            .files
            .keys()
            .filter(|path| {
                path.starts_with(&prefix) && !path[prefix.len()..].contains('/')
            })
            .map(|path| DirEntry {
                path: path.clone(),
                is_file: true,
            })
            .collect())
    }
}

fn engine_with(storage: MemoryStorage, spec: StreamSpec) -> (Arc<MemoryStorage>, StreamEngine) {
    let storage = Arc::new(storage);
    let engine = StreamEngine::new(spec, Arc::clone(&storage) as Arc<dyn StorageBackend>);
    (storage, engine)
}

#[tokio::test]
async fn test_explicit_schema_skips_sampling() {
    // the uri points nowhere; inference would fail loudly if it ran
    let override_schema = json!({"type": "object", "properties": {"id": {"type": "integer"}}});
    let spec = StreamSpec {
        schema: Some(override_schema.clone()),
        ..StreamSpec::new("s", "/missing/nothing.csv")
    };
    let (storage, mut engine) = engine_with(MemoryStorage::default(), spec);

    let schema = engine.schema().await.unwrap();
    assert_eq!(schema, override_schema);
    assert_eq!(storage.reads(), 0);
}

#[tokio::test]
async fn test_schema_inference_over_jsonl() {
    let storage = MemoryStorage::default().with_file(
        "/data/events.jsonl",
        "{\"id\": 1, \"score\": 2}\n{\"id\": 2, \"score\": 2.5, \"note\": null}\n",
    );
    let spec = StreamSpec::new("events", "/data/events.jsonl").with_format(FormatTag::Jsonl);
    let (_, mut engine) = engine_with(storage, spec);

    let schema = engine.schema().await.unwrap();
    assert_eq!(schema["properties"]["id"]["type"], "integer");
    assert_eq!(schema["properties"]["score"]["type"], "number");
    assert_eq!(schema["properties"]["note"]["type"], json!(["string", "null"]));
    assert_eq!(schema["required"], json!(["id", "score"]));
}

#[tokio::test]
async fn test_records_inject_extraction_timestamp() {
    let storage = MemoryStorage::default()
        .with_file("/data/a.jsonl", "{\"id\": 1}\n{\"id\": 2}\n");
    let spec = StreamSpec::new("s", "/data/a.jsonl")
        .with_format(FormatTag::Jsonl)
        .with_replication_key(EXTRACTED_AT_FIELD);
    let (_, mut engine) = engine_with(storage, spec);

    let records = engine.records(None).await.unwrap().collect_all().await.unwrap();
    assert_eq!(records.len(), 2);
    let stamp = records[0][EXTRACTED_AT_FIELD].as_str().unwrap().to_string();
    assert!(stamp.ends_with('Z'));
    // one stamp per run, shared by every record
    assert_eq!(records[1][EXTRACTED_AT_FIELD].as_str().unwrap(), stamp);

    // populated in data, still optional in the schema
    let schema = engine.schema().await.unwrap();
    assert!(schema["properties"][EXTRACTED_AT_FIELD].is_object());
    assert!(!schema["required"]
        .as_array()
        .unwrap_or(&Vec::new())
        .iter()
        .any(|f| f == EXTRACTED_AT_FIELD));
}

#[tokio::test]
async fn test_incremental_cursor_filters_records() {
    let storage = MemoryStorage::default().with_file(
        "/data/a.jsonl",
        "{\"id\": 1}\n{\"id\": 2}\n{\"id\": 3}\n",
    );
    let spec = StreamSpec::new("s", "/data/a.jsonl")
        .with_format(FormatTag::Jsonl)
        .with_replication_key("id");
    let (_, mut engine) = engine_with(storage, spec);

    let cursor = json!(1);
    let records = engine
        .records(Some(&cursor))
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    let ids: Vec<_> = records.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(2), json!(3)]);
}

#[tokio::test]
async fn test_first_run_without_cursor_admits_everything() {
    let storage = MemoryStorage::default()
        .with_file("/data/a.jsonl", "{\"id\": 1}\n{\"id\": 2}\n");
    let spec = StreamSpec::new("s", "/data/a.jsonl")
        .with_format(FormatTag::Jsonl)
        .with_replication_key("id");
    let (_, mut engine) = engine_with(storage, spec);

    let records = engine.records(None).await.unwrap().collect_all().await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_csv_content_fetched_once_per_run() {
    let storage = MemoryStorage::default()
        .with_file("/data/a.csv", "id,ts\n1,2024-01-15T10:00:00Z\n");
    let spec = StreamSpec::new("s", "/data/a.csv");
    let (storage, mut engine) = engine_with(storage, spec);

    engine.schema().await.unwrap();
    let _ = engine.records(None).await.unwrap().collect_all().await.unwrap();
    assert_eq!(storage.reads(), 1);
}

#[tokio::test]
async fn test_paths_resolved_once_per_run() {
    let storage = MemoryStorage::default()
        .with_file("/data/a.jsonl", "{\"id\": 1}\n")
        .with_file("/data/b.jsonl", "{\"id\": 2}\n");
    let spec = StreamSpec::new("s", "/data/*.jsonl").with_format(FormatTag::Jsonl);
    let (storage, mut engine) = engine_with(storage, spec);

    let first = engine.resolve_paths().await.unwrap();
    let second = engine.resolve_paths().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec!["/data/a.jsonl", "/data/b.jsonl"]);
    assert_eq!(storage.globs(), 1);
}

#[tokio::test]
async fn test_sampling_stops_at_bound() {
    let storage = MemoryStorage::default()
        .with_file("/data/a.jsonl", "{\"id\": 1}\n{\"id\": 2}\n{\"id\": 3}\n")
        .with_file("/data/b.jsonl", "{\"id\": 4}\n");
    let spec = StreamSpec {
        infer_samples: 2,
        ..StreamSpec::new("s", "/data/*.jsonl").with_format(FormatTag::Jsonl)
    };
    let (storage, mut engine) = engine_with(storage, spec);

    engine.infer_schema().await.unwrap();
    // the bound was hit inside the first resource; the second never opened
    assert_eq!(storage.reads(), 1);
}

#[tokio::test]
async fn test_empty_resolution_yields_empty_stream() {
    let spec = StreamSpec::new("s", "/data/*.jsonl").with_format(FormatTag::Jsonl);
    let (_, mut engine) = engine_with(MemoryStorage::default(), spec);

    let records = engine.records(None).await.unwrap().collect_all().await.unwrap();
    assert!(records.is_empty());

    // zero samples still yield a minimal schema with synthesized keys
    let spec = StreamSpec {
        keys: vec!["id".to_string()],
        ..StreamSpec::new("s", "/data/*.jsonl").with_format(FormatTag::Jsonl)
    };
    let (_, mut engine) = engine_with(MemoryStorage::default(), spec);
    let schema = engine.schema().await.unwrap();
    assert_eq!(schema["properties"]["id"]["type"], json!(["string", "null"]));
}

#[tokio::test]
async fn test_malformed_jsonl_surfaces_fatal_error() {
    let storage = MemoryStorage::default().with_file("/data/a.jsonl", "{oops\n");
    let spec = StreamSpec::new("s", "/data/a.jsonl").with_format(FormatTag::Jsonl);
    let (_, mut engine) = engine_with(storage, spec);

    let mut stream = engine.records(None).await.unwrap();
    let err = stream.try_next().await.unwrap_err();
    assert!(err.to_string().contains("/data/a.jsonl"));
}

#[tokio::test]
async fn test_from_config_builds_one_engine_per_stream() {
    let config = TapConfig::from_yaml(
        r"
streams:
  - name: one
    uri: /data/one.csv
  - name: two
    uri: /data/two.jsonl
    format: jsonl
state_checkpoint_interval: 250
",
    )
    .unwrap();

    let engines = StreamEngine::from_config(&config);
    assert_eq!(engines.len(), 2);
    assert_eq!(engines[0].name(), "one");
    assert_eq!(engines[1].name(), "two");
    assert_eq!(engines[0].checkpoint_interval(), 250);
}
