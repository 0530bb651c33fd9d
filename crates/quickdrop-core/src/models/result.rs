use serde::{Deserialize, Serialize};

use crate::storage_types::BackendKind;

/// Base path plus generated filename for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDestination {
    /// Sanitized, slash-joined, no trailing slash. Either a hierarchical path
    /// or a `s3:bucket[/subpath]` bucket destination.
    pub path: String,
    pub filename: String,
}

/// Backend-returned address of an uploaded asset. Opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocator {
    pub kind: BackendKind,
    pub address: String,
}

impl StorageLocator {
    pub fn new(kind: BackendKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }
}

/// Returned once per successful upload; the caller persists `locator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub locator: StorageLocator,
    pub filename: String,
    pub path: String,
}
