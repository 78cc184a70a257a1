//! Local filesystem backend

use super::{glob_to_regex, DirEntry, StorageBackend};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

/// Storage backend over the local filesystem, addressed by absolute paths
/// (a `file://` prefix is accepted and stripped).
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Create a local backend
    pub fn new() -> Self {
        Self
    }
}

fn strip_scheme(locator: &str) -> &str {
    locator.strip_prefix("file://").unwrap_or(locator)
}

/// Directory portion of a pattern up to its first glob metacharacter
fn glob_base(pattern: &str) -> &str {
    let meta = pattern
        .find(|c| matches!(c, '*' | '?' | '['))
        .unwrap_or(pattern.len());
    match pattern[..meta].rfind('/') {
        Some(0) => "/",
        Some(idx) => &pattern[..idx],
        None => ".",
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn read(&self, locator: &str) -> Result<Bytes> {
        let path = strip_scheme(locator);
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| Error::storage(format!("failed to read '{path}': {e}")))?;
        Ok(Bytes::from(content))
    }

    async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = strip_scheme(pattern);
        let regex = glob_to_regex(pattern)?;
        let base = glob_base(pattern);

        let mut matches = Vec::new();
        let mut pending = vec![base.to_string()];
        // walk subdirectories so `**` patterns can descend
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                // a pattern over a nonexistent directory matches nothing
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::storage(format!("failed to list '{dir}': {e}"))),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path().to_string_lossy().to_string();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if regex.is_match(&path) {
                    matches.push(path);
                }
            }
        }
        Ok(matches)
    }

    async fn list_dir(&self, uri: &str) -> Result<Vec<DirEntry>> {
        let dir = strip_scheme(uri).trim_end_matches('/');
        let dir = if dir.is_empty() { "/" } else { dir };
        if !Path::new(dir).is_dir() {
            return Err(Error::storage(format!("'{dir}' is not a directory")));
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::storage(format!("failed to list '{dir}': {e}")))?;

        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            out.push(DirEntry {
                path: entry.path().to_string_lossy().to_string(),
                is_file: entry.file_type().await?.is_file(),
            });
        }
        Ok(out)
    }
}
