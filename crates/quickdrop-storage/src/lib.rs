//! Quickdrop Storage Library
//!
//! Storage contracts, their local-filesystem and S3 implementations, and the
//! router that validates destinations and picks a backend.
//!
//! # Destinations
//!
//! - **Hierarchical**: `images/actors/portraits`. Relative, `/`-separated,
//!   never a `.`, `..` or `:`-carrying segment. Every prefix is created before
//!   the write.
//! - **Bucket**: `s3:bucket[/sub/path]` (or `s3://bucket/...`). The bucket
//!   token only ever appears first; the sub-path follows the hierarchical
//!   rules and may be empty.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod paths;
pub mod router;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_router;
#[cfg(feature = "storage-local")]
pub use local::LocalDirectoryStore;
pub use paths::{normalize_path, sanitize_filename};
pub use quickdrop_core::BackendKind;
pub use router::{StorageBackend, StorageRouter};
#[cfg(feature = "storage-s3")]
pub use s3::S3BucketStore;
pub use traits::{BucketStore, DirectoryStore, StorageError, StorageResult, UploadOptions};
