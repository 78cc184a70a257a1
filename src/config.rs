//! Configuration types for stream definitions
//!
//! This module contains the declarative configuration structures consumed by
//! the engine. Shape checking happens at deserialization time; semantic
//! validation beyond what the core needs (a usable location, a known format)
//! belongs to the outer layer.

use crate::error::Result;
use crate::format::FormatTag;
use crate::types::{JsonValue, ReplicationMethod};
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete extraction configuration loaded from YAML or JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapConfig {
    /// Stream definitions
    #[serde(default)]
    pub streams: Vec<StreamSpec>,

    /// Credential hints forwarded opaquely to the storage layer
    #[serde(default)]
    pub auth: AuthOptions,

    /// Records per state checkpoint emission. An efficiency hint for the
    /// downstream protocol layer, not a correctness mechanism.
    #[serde(default = "default_checkpoint_interval")]
    pub state_checkpoint_interval: usize,
}

fn default_checkpoint_interval() -> usize {
    10_000
}

impl TapConfig {
    /// Load a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Stream Spec
// ============================================================================

/// Declarative definition of one stream: where its files live, how they are
/// formatted, and how records should be keyed and replicated.
///
/// Immutable for the lifetime of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSpec {
    /// Unique stream identifier
    pub name: String,

    /// Single URI, optionally containing glob metacharacters
    #[serde(default)]
    pub uri: Option<String>,

    /// Explicit list of URIs; overrides `uri` if provided
    #[serde(default)]
    pub uris: Option<Vec<String>>,

    /// Filename regex filter. With a non-glob `uri`, also switches the
    /// resolver into directory-listing mode.
    #[serde(default)]
    pub pattern: Option<String>,

    /// File format
    #[serde(default)]
    pub format: FormatTag,

    /// Primary key fields
    #[serde(default)]
    pub keys: Vec<String>,

    /// Replication method
    #[serde(default)]
    pub replication_method: ReplicationMethod,

    /// Field whose monotonically increasing value drives incremental runs
    #[serde(default)]
    pub replication_key: Option<String>,

    /// Soft batch unit for chunked tabular parsing
    #[serde(default = "default_chunksize")]
    pub chunksize: usize,

    /// Number of records to sample during schema inference
    #[serde(default = "default_infer_samples")]
    pub infer_samples: usize,

    /// Explicit JSON Schema override (skips inference, returned verbatim)
    #[serde(default)]
    pub schema: Option<JsonValue>,

    /// Tabular format options
    #[serde(default)]
    pub csv: CsvOptions,

    /// JSON format options
    #[serde(default)]
    pub json: JsonOptions,
}

fn default_chunksize() -> usize {
    50_000
}

fn default_infer_samples() -> usize {
    2_000
}

impl StreamSpec {
    /// Create a minimal spec for the given stream name and location
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: Some(uri.into()),
            uris: None,
            pattern: None,
            format: FormatTag::default(),
            keys: Vec::new(),
            replication_method: ReplicationMethod::default(),
            replication_key: None,
            chunksize: default_chunksize(),
            infer_samples: default_infer_samples(),
            schema: None,
            csv: CsvOptions::default(),
            json: JsonOptions::default(),
        }
    }

    /// Set the file format
    #[must_use]
    pub fn with_format(mut self, format: FormatTag) -> Self {
        self.format = format;
        self
    }

    /// Set the replication key and switch to incremental replication
    #[must_use]
    pub fn with_replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self.replication_method = ReplicationMethod::Incremental;
        self
    }

    /// Set the primary key fields
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Set the filename regex filter
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

// ============================================================================
// Format Options
// ============================================================================

/// Options for tabular-delimited resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Whether the first row holds field names
    #[serde(default = "default_true")]
    pub header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            header: true,
        }
    }
}

/// Options for JSON resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Dot-notation path to the record container inside the document.
    /// Default: the root-level array.
    #[serde(default)]
    pub record_path: Option<String>,
}

// ============================================================================
// Auth Options
// ============================================================================

/// Credential hints for storage backends.
///
/// Forwarded opaquely to the storage layer, which maps each named field to
/// the backend's expected option. Backends also respect standard environment
/// credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthOptions {
    /// AWS named profile
    #[serde(default)]
    pub aws_profile: Option<String>,

    /// AWS access key id
    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,

    /// AWS session token
    #[serde(default)]
    pub aws_session_token: Option<String>,

    /// AWS region
    #[serde(default)]
    pub aws_region: Option<String>,
}
