//! Quickdrop Core Library
//!
//! This crate provides the domain models, error taxonomy, settings and the
//! bucket-path grammar shared by the processing, storage and upload crates.

pub mod bucket_path;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use bucket_path::{is_bucket_token, parse_bucket_path, BucketPath};
pub use config::{Settings, SettingsSource};
pub use error::{ErrorMetadata, LogLevel, UploadError, UploadResultExt};
pub use models::{
    AssetSlot, CropRect, EntityKind, ImageSource, RecordRef, ResolvedDestination,
    StorageLocator, TransformSpec, UploadRequest, UploadResult,
};
pub use storage_types::BackendKind;
