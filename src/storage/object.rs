//! Cloud object storage backend (S3, GCS, Azure)

use super::{glob_to_regex, DirEntry, StorageBackend};
use crate::config::AuthOptions;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use url::Url;

/// Storage backend over one bucket/container of a cloud object store.
///
/// Credential hints from [`AuthOptions`] map onto the builder's option
/// names; anything not hinted comes from the ambient environment
/// (`from_env`), including named AWS profiles.
pub struct CloudStorage {
    store: Arc<dyn ObjectStore>,
    scheme: String,
    bucket: String,
}

impl CloudStorage {
    /// Build the store for the bucket/container the URI addresses
    pub fn for_uri(uri: &str, auth: &AuthOptions) -> Result<Self> {
        let url = Url::parse(uri)?;
        let scheme = url.scheme().to_string();
        let bucket = url
            .host_str()
            .ok_or_else(|| Error::storage(format!("no bucket in '{uri}'")))?
            .to_string();

        let store: Arc<dyn ObjectStore> = match scheme.as_str() {
            "s3" => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);
                if let Some(key) = &auth.aws_access_key_id {
                    builder = builder.with_access_key_id(key);
                }
                if let Some(secret) = &auth.aws_secret_access_key {
                    builder = builder.with_secret_access_key(secret);
                }
                if let Some(token) = &auth.aws_session_token {
                    builder = builder.with_token(token);
                }
                if let Some(region) = &auth.aws_region {
                    builder = builder.with_region(region);
                }
                Arc::new(builder.build()?)
            }
            "gs" => Arc::new(
                GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(&bucket)
                    .build()?,
            ),
            "az" => Arc::new(
                MicrosoftAzureBuilder::from_env()
                    .with_container_name(&bucket)
                    .build()?,
            ),
            other => {
                return Err(Error::storage(format!(
                    "no object store for scheme '{other}'"
                )))
            }
        };

        Ok(Self {
            store,
            scheme,
            bucket,
        })
    }

    fn object_path(&self, locator: &str) -> Result<ObjectPath> {
        let url = Url::parse(locator)?;
        Ok(ObjectPath::from(url.path().trim_start_matches('/')))
    }

    fn locator_for(&self, path: &ObjectPath) -> String {
        format!("{}://{}/{}", self.scheme, self.bucket, path)
    }
}

#[async_trait]
impl StorageBackend for CloudStorage {
    async fn read(&self, locator: &str) -> Result<Bytes> {
        let path = self.object_path(locator)?;
        Ok(self.store.get(&path).await?.bytes().await?)
    }

    async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let url = Url::parse(pattern)?;
        let key_pattern = url.path().trim_start_matches('/');
        let regex = glob_to_regex(key_pattern)?;

        // list from the longest literal prefix to bound the scan
        let meta = key_pattern
            .find(|c| matches!(c, '*' | '?' | '['))
            .unwrap_or(key_pattern.len());
        let prefix_str = match key_pattern[..meta].rfind('/') {
            Some(idx) => &key_pattern[..idx],
            None => "",
        };
        let prefix = (!prefix_str.is_empty()).then(|| ObjectPath::from(prefix_str));

        let objects: Vec<_> = self.store.list(prefix.as_ref()).try_collect().await?;
        Ok(objects
            .iter()
            .filter(|meta| regex.is_match(meta.location.as_ref()))
            .map(|meta| self.locator_for(&meta.location))
            .collect())
    }

    async fn list_dir(&self, uri: &str) -> Result<Vec<DirEntry>> {
        let url = Url::parse(uri)?;
        let prefix_str = url.path().trim_matches('/');
        let prefix = (!prefix_str.is_empty()).then(|| ObjectPath::from(prefix_str));

        let listing = self.store.list_with_delimiter(prefix.as_ref()).await?;

        let mut entries: Vec<DirEntry> = listing
            .objects
            .iter()
            .map(|meta| DirEntry {
                path: self.locator_for(&meta.location),
                is_file: true,
            })
            .collect();
        entries.extend(listing.common_prefixes.iter().map(|p| DirEntry {
            path: self.locator_for(p),
            is_file: false,
        }));
        Ok(entries)
    }
}
