//! Quickdrop upload pipeline
//!
//! Ties the image engine and the storage router together: a request is
//! validated, its image converted to WebP, named, placed and uploaded.

pub mod hash;
pub mod orchestrator;
pub mod policy;

pub use hash::generate_hash;
pub use orchestrator::{UploadOrchestrator, UploadStage};
pub use policy::{sanitize_stem, slugify_name, FilenameAndPathPolicy};
