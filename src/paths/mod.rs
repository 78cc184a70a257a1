//! Path resolution
//!
//! Turns a stream's location spec (single URI, glob, explicit list, or
//! directory plus filename pattern) into an ordered, deterministic list of
//! concrete resource locators. Resolution runs once per stream per run; the
//! owning engine caches the result so remote listing and connection setup
//! are not repeated.

use crate::config::StreamSpec;
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use tracing::{debug, warn};

/// Whether a location string contains glob metacharacters
pub fn looks_like_glob(uri: &str) -> bool {
    uri.contains(['*', '?', '[', ']'])
}

/// Resolve a stream's location spec into concrete resource locators.
///
/// An explicit `uris` list is used verbatim, in given order. A glob
/// expands through the storage backend and sorts lexicographically. A
/// non-glob location with a filename pattern configured is treated as a
/// directory: listing failures are logged and fall back to the literal
/// location rather than failing the run. Zero matches is not an error;
/// it yields an empty record stream.
pub async fn resolve(spec: &StreamSpec, storage: &dyn StorageBackend) -> Result<Vec<String>> {
    if let Some(uris) = &spec.uris {
        return Ok(uris.clone());
    }

    let uri = spec
        .uri
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::missing_location(&spec.name))?;

    let paths = if looks_like_glob(uri) {
        let mut paths = storage.glob(uri).await?;
        paths.sort();
        paths
    } else if spec.pattern.is_some() {
        match storage.list_dir(uri).await {
            Ok(entries) => {
                let mut files: Vec<String> = entries
                    .into_iter()
                    .filter(|entry| entry.is_file)
                    .map(|entry| entry.path)
                    .collect();
                files.sort();
                debug!(
                    stream = %spec.name,
                    count = files.len(),
                    "listed directory for pattern filtering"
                );
                files
            }
            Err(e) => {
                warn!(
                    stream = %spec.name,
                    uri,
                    error = %e,
                    "directory listing failed, falling back to literal path"
                );
                vec![uri.to_string()]
            }
        }
    } else {
        vec![uri.to_string()]
    };

    apply_pattern(spec, paths)
}

/// Keep only paths whose basename matches the configured filename regex
fn apply_pattern(spec: &StreamSpec, paths: Vec<String>) -> Result<Vec<String>> {
    let Some(pattern) = &spec.pattern else {
        return Ok(paths);
    };
    let regex = regex::Regex::new(pattern)
        .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;

    Ok(paths
        .into_iter()
        .filter(|path| {
            let basename = path.rsplit('/').next().unwrap_or(path);
            regex.is_match(basename)
        })
        .collect())
}
