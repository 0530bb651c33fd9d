//! Backend contracts
//!
//! Two closed families: [`DirectoryStore`] for directory trees that need
//! folders created before a write, and [`BucketStore`] for object storage
//! addressed by bucket plus key prefix. The router wraps one of each in
//! [`crate::StorageBackend`].

use async_trait::async_trait;
use bytes::Bytes;
use quickdrop_core::constants::CANONICAL_CONTENT_TYPE;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The directory (or object) is already there. Directory creation treats
    /// this as success.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-upload options handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            content_type: CANONICAL_CONTENT_TYPE.to_string(),
        }
    }
}

/// Directory-tree storage.
///
/// Paths are already normalized by the router: `/`-separated, relative, no
/// `.`/`..` segments.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// List the entries of `path`; `NotFound` if it does not exist.
    async fn browse(&self, path: &str) -> StorageResult<Vec<String>>;

    /// Create a single directory whose parent exists. `AlreadyExists` if it
    /// is already there.
    async fn create_directory(&self, path: &str) -> StorageResult<()>;

    /// Write `data` as `{path}/{filename}` and return the locator, if the
    /// backend produced one.
    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> StorageResult<Option<String>>;
}

/// Bucket/object storage.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Write `data` as `{path}/{filename}` in `bucket` (`path` may be empty)
    /// and return the locator, if the backend produced one.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> StorageResult<Option<String>>;

    /// Buckets a path picker can offer. Backends that cannot enumerate
    /// buckets return an empty list.
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }
}
