//! Quickdrop image processing
//!
//! Turns an image source (in-memory blob, http(s)/data/blob URL, clipboard
//! capture) into canonical WebP bytes, applying scale, rotation, flips and an
//! optional crop on the way.
//!
//! The pipeline is `decode → render → encode`:
//! - [`source`] resolves and fetches sources into decodable bytes
//! - [`transform`] computes output geometry and renders the working surface
//! - [`compression`] encodes the surface under a [`QualityPolicy`]
//! - [`engine`] sequences the three as async, result-returning calls

pub mod compression;
pub mod engine;
pub mod source;
pub mod transform;

pub use compression::{ImageCompressor, QualityPolicy};
pub use engine::ImageEngine;
pub use source::{
    BlobRegistry, ClipboardItem, ClipboardProvider, MemoryClipboard, ObjectUrl, RemoteFetcher,
    SourceUrl,
};
pub use transform::{compute_geometry, render, Geometry};
