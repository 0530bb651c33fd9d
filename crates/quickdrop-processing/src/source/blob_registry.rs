use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use uuid::Uuid;

pub const BLOB_URL_PREFIX: &str = "blob:quickdrop/";

/// In-process table of `blob:` URLs.
///
/// Entries only live as long as the [`ObjectUrl`] that created them. This is
/// the single piece of state the engine shares across calls; every entry is
/// keyed by a fresh UUID so concurrent decodes never see each other's data.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register `data` under a new `blob:` URL. The URL is revoked when the
    /// returned guard is dropped.
    pub fn create_object_url(&self, data: Bytes) -> ObjectUrl {
        let url = format!("{}{}", BLOB_URL_PREFIX, Uuid::new_v4());
        self.lock().insert(url.clone(), data);
        tracing::trace!(url = %url, "Created object URL");

        ObjectUrl {
            url,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.lock().get(url).cloned()
    }

    fn revoke(&self, url: &str) {
        if self.lock().remove(url).is_some() {
            tracing::trace!(url = %url, "Revoked object URL");
        }
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped `blob:` handle; revokes itself on drop.
pub struct ObjectUrl {
    url: String,
    registry: BlobRegistry,
}

impl ObjectUrl {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

impl std::fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}
