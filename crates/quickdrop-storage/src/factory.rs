#[cfg(feature = "storage-local")]
use crate::LocalDirectoryStore;
#[cfg(feature = "storage-s3")]
use crate::S3BucketStore;
use crate::{StorageError, StorageResult, StorageRouter};
use quickdrop_core::Settings;
#[cfg(any(feature = "storage-local", feature = "storage-s3"))]
use std::sync::Arc;

/// Create a storage router based on configuration
///
/// The hierarchical backend is always required. The bucket backend is added
/// when a region is configured (directly or via `AWS_REGION`).
pub async fn create_router(settings: &Settings) -> StorageResult<StorageRouter> {
    let router = with_local(StorageRouter::new(), settings).await?;
    Ok(with_s3(router, settings))
}

#[cfg(feature = "storage-local")]
async fn with_local(router: StorageRouter, settings: &Settings) -> StorageResult<StorageRouter> {
    let base_path = settings.local_storage_path.clone().ok_or_else(|| {
        StorageError::ConfigError("QUICKDROP_LOCAL_STORAGE_PATH not configured".to_string())
    })?;
    let store = LocalDirectoryStore::new(base_path, settings.local_storage_base_url.clone()).await?;
    Ok(router.with_hierarchical(Arc::new(store)))
}

#[cfg(not(feature = "storage-local"))]
async fn with_local(_router: StorageRouter, _settings: &Settings) -> StorageResult<StorageRouter> {
    Err(StorageError::ConfigError(
        "Local storage backend not available (storage-local feature not enabled)".to_string(),
    ))
}

#[cfg(feature = "storage-s3")]
fn with_s3(router: StorageRouter, settings: &Settings) -> StorageRouter {
    let Some(region) = settings.s3_region.clone() else {
        if settings.selected_bucket().is_some() {
            tracing::warn!("Bucket storage selected but no S3 region configured");
        }
        return router;
    };

    let mut buckets = settings.known_buckets.clone();
    if let Some(bucket) = settings.selected_bucket() {
        if !buckets.iter().any(|b| b == bucket) {
            buckets.push(bucket.to_string());
        }
    }

    let store = S3BucketStore::new(region, settings.s3_endpoint.clone(), buckets);
    router.with_bucket(Arc::new(store))
}

#[cfg(not(feature = "storage-s3"))]
fn with_s3(router: StorageRouter, settings: &Settings) -> StorageRouter {
    if settings.selected_bucket().is_some() {
        tracing::warn!("Bucket storage selected but the storage-s3 feature is not enabled");
    }
    router
}
