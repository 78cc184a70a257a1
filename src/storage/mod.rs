//! Storage-access layer
//!
//! The engine treats storage as a set of capability-typed black boxes:
//! whole-object reads, glob expansion, and directory listing. Backend
//! protocol details never leak past this module; the only backend-specific
//! logic is mapping named credential hints to each builder's option names.
//!
//! [`StorageRouter`] dispatches per URI scheme: `s3://`, `gs://` and `az://`
//! go to an [`object_store`]-backed [`CloudStorage`]; everything else is a
//! local path served by [`LocalStorage`].

mod local;
mod object;

pub use local::LocalStorage;
pub use object::CloudStorage;

use crate::config::AuthOptions;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One entry from a directory listing, in absolute-path form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Absolute path or URI of the entry
    pub path: String,
    /// Whether the entry is a file (as opposed to a directory/prefix)
    pub is_file: bool,
}

/// Capability contract every storage backend satisfies
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch one resource's full byte content
    async fn read(&self, locator: &str) -> Result<Bytes>;

    /// Expand a location containing glob metacharacters into concrete
    /// locators. Order is unspecified; callers sort for determinism.
    async fn glob(&self, pattern: &str) -> Result<Vec<String>>;

    /// List a directory's immediate entries
    async fn list_dir(&self, uri: &str) -> Result<Vec<DirEntry>>;
}

// ============================================================================
// Scheme Router
// ============================================================================

/// Per-scheme storage dispatch with one cached backend per scheme+bucket.
pub struct StorageRouter {
    auth: AuthOptions,
    backends: Mutex<HashMap<String, Arc<dyn StorageBackend>>>,
}

impl StorageRouter {
    /// Create a router carrying the run's credential hints
    pub fn new(auth: AuthOptions) -> Self {
        Self {
            auth,
            backends: Mutex::new(HashMap::new()),
        }
    }

    fn backend_for(&self, uri: &str) -> Result<Arc<dyn StorageBackend>> {
        let key = cache_key(uri);
        let mut backends = self.backends.lock().expect("storage cache poisoned");
        if let Some(backend) = backends.get(&key) {
            return Ok(Arc::clone(backend));
        }

        let backend: Arc<dyn StorageBackend> = match uri.split_once("://") {
            Some(("s3" | "gs" | "az", _)) => Arc::new(CloudStorage::for_uri(uri, &self.auth)?),
            Some(("file", _)) | None => Arc::new(LocalStorage::new()),
            Some((scheme, _)) => {
                return Err(Error::storage(format!(
                    "no storage backend for scheme '{scheme}'"
                )))
            }
        };
        backends.insert(key, Arc::clone(&backend));
        Ok(backend)
    }
}

fn cache_key(uri: &str) -> String {
    match uri.split_once("://") {
        Some((scheme, rest)) if scheme != "file" => {
            let bucket = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{bucket}")
        }
        _ => "file".to_string(),
    }
}

#[async_trait]
impl StorageBackend for StorageRouter {
    async fn read(&self, locator: &str) -> Result<Bytes> {
        self.backend_for(locator)?.read(locator).await
    }

    async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        self.backend_for(pattern)?.glob(pattern).await
    }

    async fn list_dir(&self, uri: &str) -> Result<Vec<DirEntry>> {
        self.backend_for(uri)?.list_dir(uri).await
    }
}

// ============================================================================
// Glob Translation
// ============================================================================

/// Translate a glob pattern into an anchored regex.
///
/// `*` and `?` stop at path separators; `**` crosses them; `[...]` classes
/// pass through (`[!` negates).
pub(crate) fn glob_to_regex(pattern: &str) -> Result<regex::Regex> {
    let mut re = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    re.push_str(".*");
                } else {
                    re.push_str("[^/]*");
                }
            }
            '?' => re.push_str("[^/]"),
            '[' => {
                re.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    re.push('^');
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        re.push(']');
                        break;
                    }
                    if inner == '\\' {
                        re.push_str("\\\\");
                    } else {
                        re.push(inner);
                    }
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }

    re.push('$');
    regex::Regex::new(&re).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))
}
