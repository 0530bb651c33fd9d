use crate::traits::{DirectoryStore, StorageError, StorageResult, UploadOptions};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Directory-tree storage on the local filesystem
#[derive(Clone)]
pub struct LocalDirectoryStore {
    base_path: PathBuf,
    base_url: Option<String>,
}

impl LocalDirectoryStore {
    /// Create a new LocalDirectoryStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored images (e.g., "/var/lib/quickdrop/data")
    /// * `base_url` - Base URL the root is served under (e.g., "http://localhost:30000").
    ///   Without one, locators are paths relative to the root.
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: Option<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalDirectoryStore {
            base_path,
            base_url: base_url.filter(|u| !u.trim().is_empty()),
        })
    }

    /// Convert a relative key to a filesystem path with security validation
    ///
    /// Rejects keys that could escape the base directory, including through
    /// symlinks that already exist below it.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.split(['/', '\\']).any(|s| s == "..") || key.starts_with('/') || key.contains(':') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' contains invalid characters",
                key
            )));
        }

        let path = self.base_path.join(key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(format!(
                    "Storage key '{}' resolves outside storage directory",
                    key
                )));
            }
        }

        Ok(path)
    }

    /// Locator returned to the caller
    fn generate_url(&self, key: &str) -> String {
        match self.base_url {
            Some(ref base_url) => format!("{}/{}", base_url.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl DirectoryStore for LocalDirectoryStore {
    async fn browse(&self, path: &str) -> StorageResult<Vec<String>> {
        let dir = self.key_to_path(path)?;

        let mut entries = fs::read_dir(&dir).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            _ => StorageError::IoError(e),
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names)
    }

    async fn create_directory(&self, path: &str) -> StorageResult<()> {
        let dir = self.key_to_path(path)?;

        fs::create_dir(&dir).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            ErrorKind::NotFound => StorageError::NotFound(format!("parent of {}", path)),
            _ => StorageError::IoError(e),
        })?;

        tracing::debug!(path = %dir.display(), "Created directory");
        Ok(())
    }

    async fn upload(
        &self,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> StorageResult<Option<String>> {
        let key = if path.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", path, filename)
        };
        let file_path = self.key_to_path(&key)?;
        let size = data.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&file_path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to create file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to write file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to sync file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %file_path.display(),
            key = %key,
            content_type = %options.content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(Some(url))
    }
}
