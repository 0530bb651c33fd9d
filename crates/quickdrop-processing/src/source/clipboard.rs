use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use quickdrop_core::UploadError;

/// One clipboard entry, offered in one or more MIME types.
#[derive(Debug, Clone, Default)]
pub struct ClipboardItem {
    /// Declared types in the order the source offered them
    pub types: Vec<String>,
    data: HashMap<String, Bytes>,
}

impl ClipboardItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, mime: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let mime = mime.into();
        if !self.types.contains(&mime) {
            self.types.push(mime.clone());
        }
        self.data.insert(mime, data.into());
        self
    }

    pub fn get_type(&self, mime: &str) -> Option<&Bytes> {
        self.data.get(mime)
    }
}

/// Clipboard access, supplied by the host.
#[async_trait]
pub trait ClipboardProvider: Send + Sync {
    async fn read(&self) -> anyhow::Result<Vec<ClipboardItem>>;
}

/// Fixed clipboard contents (tests, piping a captured clipboard through the CLI)
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    items: Vec<ClipboardItem>,
}

impl MemoryClipboard {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ClipboardProvider for MemoryClipboard {
    async fn read(&self) -> anyhow::Result<Vec<ClipboardItem>> {
        Ok(self.items.clone())
    }
}

/// Return the data of the first item type that starts with `image/`.
pub async fn load_from_clipboard(provider: &dyn ClipboardProvider) -> Result<Bytes, UploadError> {
    let items = provider
        .read()
        .await
        .map_err(|e| UploadError::decode(format!("could not read clipboard: {:#}", e)))?;

    for item in &items {
        if let Some(mime) = item.types.iter().find(|t| t.starts_with("image/")) {
            tracing::debug!(mime = %mime, "Found image in clipboard");
            return item.get_type(mime).cloned().ok_or_else(|| {
                UploadError::decode(format!("clipboard offered {} but returned no data", mime))
            });
        }
    }

    Err(UploadError::unsupported_source("No image found in clipboard"))
}
