use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::transform::TransformSpec;

/// Reference to the record the uploaded image will be attached to. The
/// pipeline only reads it; applying the locator is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RecordRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// Where the image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Bytes already in memory (file contents, clipboard capture, fetched body)
    Blob(Bytes),
    /// An `http`, `https`, `data` or `blob` URL, possibly relative
    Url(String),
}

impl ImageSource {
    pub fn blob(data: impl Into<Bytes>) -> Self {
        ImageSource::Blob(data.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        ImageSource::Url(url.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImageSource::Blob(data) => data.is_empty(),
            ImageSource::Url(url) => url.trim().is_empty(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ImageSource::Blob(data) => format!("blob ({} bytes)", data.len()),
            ImageSource::Url(url) if url.starts_with("data:") => "data URL".to_string(),
            ImageSource::Url(url) => url.clone(),
        }
    }
}

/// One upload call's input.
///
/// Optional fields are checked by the orchestrator's validation stage so that
/// incomplete requests fail with `InvalidInput` rather than at construction.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub record: Option<RecordRef>,
    pub entity_kind: Option<EntityKind>,
    pub field: String,
    /// Display name used for the filename; defaults to the record's name.
    pub name: Option<String>,
    pub source: Option<ImageSource>,
    pub transform: Option<TransformSpec>,
}

impl UploadRequest {
    pub fn new(
        record: RecordRef,
        entity_kind: EntityKind,
        field: impl Into<String>,
        source: ImageSource,
    ) -> Self {
        Self {
            record: Some(record),
            entity_kind: Some(entity_kind),
            field: field.into(),
            name: None,
            source: Some(source),
            transform: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: TransformSpec) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Explicit name, then the record's name, then `image`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.record
                    .as_ref()
                    .and_then(|r| r.name.as_deref())
                    .filter(|n| !n.trim().is_empty())
            })
            .unwrap_or(crate::constants::DEFAULT_NAME_SLUG)
    }
}
