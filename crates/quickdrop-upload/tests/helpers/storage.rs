//! Mock storage backends for testing without a filesystem or S3.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use quickdrop_storage::{BucketStore, DirectoryStore, StorageError, StorageResult, UploadOptions};

/// Directory tree kept in memory. Locators are `mock://{path}/{file}`.
#[derive(Clone, Default)]
pub struct MockDirectoryStore {
    dirs: Arc<Mutex<HashSet<String>>>,
    files: Arc<Mutex<HashMap<String, (Bytes, String)>>>,
}

impl MockDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    /// Stored bytes and content type by `path/filename`.
    pub fn file(&self, key: &str) -> Option<(Bytes, String)> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl DirectoryStore for MockDirectoryStore {
    async fn browse(&self, path: &str) -> StorageResult<Vec<String>> {
        if path.is_empty() || self.has_dir(path) {
            Ok(Vec::new())
        } else {
            Err(StorageError::NotFound(path.to_string()))
        }
    }

    async fn create_directory(&self, path: &str) -> StorageResult<()> {
        let mut dirs = self.dirs.lock().unwrap();
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !dirs.contains(parent) {
                return Err(StorageError::NotFound(parent.to_string()));
            }
        }
        if !dirs.insert(path.to_string()) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> StorageResult<Option<String>> {
        if !path.is_empty() && !self.has_dir(path) {
            return Err(StorageError::NotFound(path.to_string()));
        }
        let key = if path.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", path, filename)
        };
        self.files
            .lock()
            .unwrap()
            .insert(key.clone(), (data, options.content_type.clone()));
        Ok(Some(format!("mock://{}", key)))
    }
}

/// Bucket store kept in memory, keyed by `(bucket, object key)`.
#[derive(Clone, Default)]
pub struct MockBucketStore {
    objects: Arc<Mutex<HashMap<(String, String), Bytes>>>,
}

impl MockBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl BucketStore for MockBucketStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        filename: &str,
        _options: &UploadOptions,
    ) -> StorageResult<Option<String>> {
        let key = if path.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", path, filename)
        };
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.clone()), data);
        Ok(Some(format!("https://{}.mock/{}", bucket, key)))
    }
}
