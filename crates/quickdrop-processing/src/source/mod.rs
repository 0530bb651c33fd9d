//! Image source ingestion
//!
//! Everything here ends in raw, still-encoded bytes; decoding is the
//! engine's job.

mod blob_registry;
mod clipboard;
pub mod url;

pub use blob_registry::{BlobRegistry, ObjectUrl, BLOB_URL_PREFIX};
pub use clipboard::{load_from_clipboard, ClipboardItem, ClipboardProvider, MemoryClipboard};
pub use url::{decode_data_url, FetchedBody, RemoteFetcher, SourceUrl};
