//! Application-wide constants.

/// Extension of the canonical output encoding (lossy WebP).
pub const CANONICAL_EXTENSION: &str = "webp";

/// MIME type of the canonical output encoding.
pub const CANONICAL_CONTENT_TYPE: &str = "image/webp";

/// Scheme token that marks a base path as a bucket destination (`s3:bucket/...`).
pub const BUCKET_SCHEME: &str = "s3";

/// Filename used when sanitization leaves nothing behind.
pub const DEFAULT_FILENAME: &str = "image.webp";

/// Display-name slug used when the caller's name sanitizes to nothing.
pub const DEFAULT_NAME_SLUG: &str = "image";

/// Base path used when a configured path sanitizes to nothing.
pub const DEFAULT_BASE_PATH: &str = "images";

/// Type label for (entity-kind, field) pairs without a dedicated label.
pub const FALLBACK_TYPE_LABEL: &str = "img";

/// Root segment of the per-world isolation prefix (`worlds/{id}/`).
pub const ISOLATION_ROOT: &str = "worlds";

pub const DEFAULT_NAMING_TEMPLATE: &str = "{name}-{type}-{hash}";
pub const DEFAULT_HASH_LENGTH: usize = 8;
pub const MIN_HASH_LENGTH: usize = 4;
pub const MAX_HASH_LENGTH: usize = 16;

pub const DEFAULT_COMPRESS_QUALITY: f32 = 0.8;
pub const MIN_COMPRESS_QUALITY: f32 = 0.1;
pub const MAX_COMPRESS_QUALITY: f32 = 1.0;

/// Upper bound on the display-name slug.
pub const MAX_NAME_SLUG_LEN: usize = 32;

/// Upper bound on the generated filename stem (before the extension).
pub const MAX_FILENAME_STEM_LEN: usize = 64;
