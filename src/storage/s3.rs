//! S3-compatible object-store binding
//!
//! Works against AWS S3 and S3-compatible services (R2, B2, Wasabi, MinIO)
//! via a non-empty endpoint override.

use super::FileStore;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Connection parameters for an S3-compatible store
#[derive(Debug, Clone)]
pub struct S3Options {
    pub bucket: String,
    pub prefix: String,
    pub region: String,
    /// Non-empty for non-AWS endpoints
    pub endpoint_override: String,
    /// "https" (default) or "http" for local MinIO
    pub scheme: String,
}

/// `FileStore` over an S3-compatible bucket.
///
/// The repository and service are synchronous, so the async client is
/// driven by a dedicated current-thread runtime owned by the store. Must
/// not be called from inside an async context.
pub struct S3FileStore {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    runtime: Runtime,
}

impl S3FileStore {
    pub fn new(options: &S3Options) -> Result<Self> {
        if options.bucket.is_empty() {
            return Err(Error::Storage("s3 backend requires a bucket".into()));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&options.bucket)
            .with_region(&options.region);

        if !options.endpoint_override.is_empty() {
            let endpoint = if options.endpoint_override.contains("://") {
                options.endpoint_override.clone()
            } else {
                format!("{}://{}", options.scheme, options.endpoint_override)
            };
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(options.scheme == "http");
        }

        let store = builder.build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            store: Arc::new(store),
            prefix: options.prefix.trim_matches('/').to_string(),
            runtime,
        })
    }

    fn object_path(&self, path: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(path)
        } else {
            ObjectPath::from(format!("{}/{}", self.prefix, path))
        }
    }

    fn strip_prefix<'a>(&self, full: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            full
        } else {
            full.strip_prefix(self.prefix.as_str())
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(full)
        }
    }
}

impl FileStore for S3FileStore {
    fn read(&self, path: &str) -> Result<Bytes> {
        let location = self.object_path(path);
        let store = self.store.clone();
        let data = self
            .runtime
            .block_on(async move { store.get(&location).await?.bytes().await })?;
        Ok(data)
    }

    fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let location = self.object_path(path);
        let store = self.store.clone();
        self.runtime
            .block_on(async move { store.put(&location, PutPayload::from(data)).await })?;
        Ok(())
    }

    fn create_dir_all(&self, _path: &str) -> Result<()> {
        // Object stores have no directories
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let location = self.object_path(path);
        let store = self.store.clone();
        let outcome = self
            .runtime
            .block_on(async move { store.head(&location).await });
        match outcome {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_recursive(&self, prefix: &str) -> Result<Vec<String>> {
        let location = self.object_path(prefix);
        let store = self.store.clone();
        let metas: Vec<object_store::ObjectMeta> = self
            .runtime
            .block_on(async move { store.list(Some(&location)).try_collect().await })?;

        let mut paths: Vec<String> = metas
            .into_iter()
            .map(|meta| self.strip_prefix(meta.location.as_ref()).to_string())
            .collect();
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_bucket() {
        let options = S3Options {
            bucket: String::new(),
            prefix: "mde".to_string(),
            region: "us-east-1".to_string(),
            endpoint_override: String::new(),
            scheme: "https".to_string(),
        };
        assert!(matches!(S3FileStore::new(&options), Err(Error::Storage(_))));
    }

    #[test]
    fn test_prefix_joining() {
        let options = S3Options {
            bucket: "market-data".to_string(),
            prefix: "/mde/".to_string(),
            region: "us-east-1".to_string(),
            endpoint_override: String::new(),
            scheme: "https".to_string(),
        };
        let store = S3FileStore::new(&options).unwrap();
        assert_eq!(
            store.object_path("snapshots/abc.parquet").as_ref(),
            "mde/snapshots/abc.parquet"
        );
        assert_eq!(
            store.strip_prefix("mde/snapshots/abc.parquet"),
            "snapshots/abc.parquet"
        );
    }
}
