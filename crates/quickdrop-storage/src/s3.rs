use crate::traits::{BucketStore, StorageError, StorageResult, UploadOptions};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload, Result as ObjectResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// S3 bucket storage.
///
/// Unlike a single-bucket store, the destination bucket comes with each
/// upload, so one client is built lazily per bucket and reused.
#[derive(Clone)]
pub struct S3BucketStore {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    known_buckets: Vec<String>,
    stores: Arc<Mutex<HashMap<String, AmazonS3>>>,
}

impl S3BucketStore {
    /// Create a new S3BucketStore instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `known_buckets` - Buckets offered by [`BucketStore::list_buckets`]
    pub fn new(region: String, endpoint_url: Option<String>, known_buckets: Vec<String>) -> Self {
        Self {
            region,
            endpoint_url,
            known_buckets,
            stores: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut stores = match self.stores.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }

        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, bucket: &str, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
        }
    }

    fn object_key(path: &str, filename: &str) -> String {
        if path.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", path, filename)
        }
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> StorageResult<Option<String>> {
        let store = self.store_for(bucket)?;
        let key = Self::object_key(path, filename);
        let size = data.len() as u64;
        let location = Path::from(key.clone());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, options.content_type.clone().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(data), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::BackendError(e.to_string())
        })?;

        let url = self.generate_url(bucket, &key);

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(Some(url))
    }

    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        // object_store is scoped to one bucket and has no account-level listing.
        Ok(self.known_buckets.clone())
    }
}
