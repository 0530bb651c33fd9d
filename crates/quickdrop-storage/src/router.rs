//! Storage routing
//!
//! [`StorageRouter`] owns at most one backend of each family. Every upload is
//! normalized first, then dispatched by the shape of its destination: a
//! `s3:bucket[/path]` destination goes to the bucket backend, anything else to
//! the hierarchical one.

use std::sync::Arc;

use bytes::Bytes;
use quickdrop_core::{parse_bucket_path, BackendKind, StorageLocator, UploadError};

use crate::paths::{normalize_path, sanitize_filename};
use crate::traits::{BucketStore, DirectoryStore, StorageError, UploadOptions};

/// One backend, tagged by family.
#[derive(Clone)]
pub enum StorageBackend {
    Hierarchical(Arc<dyn DirectoryStore>),
    Bucket(Arc<dyn BucketStore>),
}

impl StorageBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            StorageBackend::Hierarchical(_) => BackendKind::Hierarchical,
            StorageBackend::Bucket(_) => BackendKind::Bucket,
        }
    }

    /// Materialize every prefix of `path`, left to right.
    ///
    /// "Already exists" counts as success. Any other creation error is logged
    /// and skipped; the upload that follows reports the real failure if the
    /// directory is truly missing. Bucket backends have no directories.
    pub async fn ensure_path(&self, path: &str) {
        let store = match self {
            StorageBackend::Hierarchical(store) => store,
            StorageBackend::Bucket(_) => return,
        };

        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);

            if store.browse(&current).await.is_ok() {
                continue;
            }

            match store.create_directory(&current).await {
                Ok(()) | Err(StorageError::AlreadyExists(_)) => {}
                Err(e) => {
                    let err = UploadError::DirectoryCreateFailure(format!("{}: {}", current, e));
                    tracing::warn!(
                        path = %current,
                        error = %err,
                        "Could not create directory"
                    );
                }
            }
        }
    }

    /// Upload to an already-normalized destination.
    ///
    /// For a bucket backend `path` must be a bucket destination.
    pub async fn upload(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<StorageLocator, UploadError> {
        let locator = match self {
            StorageBackend::Hierarchical(store) => {
                self.ensure_path(path).await;
                store.upload(path, data, filename, options).await
            }
            StorageBackend::Bucket(store) => {
                let bucket_path = parse_bucket_path(path).ok_or_else(|| {
                    UploadError::path(format!("'{}' is not a bucket destination", path))
                })?;
                let sub_path = normalize_path(&bucket_path.path, true)?;
                store
                    .upload(&bucket_path.bucket, &sub_path, data, filename, options)
                    .await
            }
        }
        .map_err(|e| match e {
            StorageError::InvalidKey(msg) => UploadError::path(msg),
            other => UploadError::backend(other.to_string()),
        })?;

        match locator {
            Some(address) if !address.trim().is_empty() => {
                Ok(StorageLocator::new(self.kind(), address))
            }
            _ => Err(UploadError::backend("No path returned")),
        }
    }
}

/// Validates destinations and dispatches uploads to the matching backend.
#[derive(Clone, Default)]
pub struct StorageRouter {
    hierarchical: Option<StorageBackend>,
    bucket: Option<StorageBackend>,
}

impl StorageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hierarchical(mut self, store: Arc<dyn DirectoryStore>) -> Self {
        self.hierarchical = Some(StorageBackend::Hierarchical(store));
        self
    }

    pub fn with_bucket(mut self, store: Arc<dyn BucketStore>) -> Self {
        self.bucket = Some(StorageBackend::Bucket(store));
        self
    }

    /// Backend that serves an (unnormalized) destination.
    pub fn backend_for(&self, path: &str) -> Result<&StorageBackend, UploadError> {
        let (backend, kind) = if parse_bucket_path(path).is_some() {
            (self.bucket.as_ref(), BackendKind::Bucket)
        } else {
            (self.hierarchical.as_ref(), BackendKind::Hierarchical)
        };

        backend.ok_or_else(|| {
            UploadError::backend(format!("no {} storage backend is configured", kind))
        })
    }

    /// Buckets the bucket backend can offer, or none without one.
    pub async fn list_buckets(&self) -> Result<Vec<String>, UploadError> {
        match self.bucket {
            Some(StorageBackend::Bucket(ref store)) => store
                .list_buckets()
                .await
                .map_err(|e| UploadError::backend(e.to_string())),
            _ => Ok(Vec::new()),
        }
    }

    /// Normalize `path` and `filename`, then upload canonical-format bytes.
    pub async fn upload(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
    ) -> Result<StorageLocator, UploadError> {
        self.upload_with_options(path, data, filename, &UploadOptions::default())
            .await
    }

    pub async fn upload_with_options(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> Result<StorageLocator, UploadError> {
        if data.is_empty() || !options.content_type.starts_with("image/") {
            return Err(UploadError::backend(format!(
                "Invalid image payload ({} bytes of {})",
                data.len(),
                options.content_type
            )));
        }

        let safe_path = normalize_path(path, false)?;
        let safe_filename = sanitize_filename(filename);
        let backend = self.backend_for(&safe_path)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let locator = backend
            .upload(&safe_path, data, &safe_filename, options)
            .await?;

        tracing::info!(
            backend = %locator.kind,
            path = %safe_path,
            filename = %safe_filename,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload routed"
        );

        Ok(locator)
    }
}

impl std::fmt::Debug for StorageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRouter")
            .field("hierarchical", &self.hierarchical.is_some())
            .field("bucket", &self.bucket.is_some())
            .finish()
    }
}
