//! Naming and destination policy
//!
//! Filenames follow the configured template (`{name}-{type}-{hash}` by
//! default) and always end in the canonical extension. Base paths come from
//! the per-slot settings and resolve with this precedence:
//!
//! 1. a configured path written as a bucket destination (`s3:bucket[/sub]`)
//! 2. bucket storage selected with a bucket name: the configured path becomes
//!    the sub-path in that bucket
//! 3. otherwise a hierarchical path, placed under `worlds/{id}/` when an
//!    isolation id is configured
//!
//! Bucket destinations never get the isolation prefix.

use quickdrop_core::constants::{
    BUCKET_SCHEME, CANONICAL_EXTENSION, DEFAULT_BASE_PATH, DEFAULT_NAME_SLUG, ISOLATION_ROOT,
    MAX_FILENAME_STEM_LEN, MAX_NAME_SLUG_LEN,
};
use quickdrop_core::models::type_label_for;
use quickdrop_core::{
    is_bucket_token, parse_bucket_path, AssetSlot, BucketPath, EntityKind, ResolvedDestination,
    Settings, UploadError,
};

use crate::hash::generate_hash;

/// CJK Unified Ideographs, the non-ASCII range kept in names.
fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Replace each run of `ch` with a single one.
fn collapse(value: &str, ch: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ch && out.ends_with(ch) {
            continue;
        }
        out.push(c);
    }
    out
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Lowercase slug of a display name, at most 32 characters. Empty when the
/// name has nothing usable.
pub fn slugify_name(name: &str) -> String {
    let mapped: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || is_cjk(c) {
                c
            } else {
                '-'
            }
        })
        .collect();

    let collapsed = collapse(&mapped, '-');
    truncate_chars(collapsed.trim_matches('-'), MAX_NAME_SLUG_LEN).to_string()
}

/// Make a substituted template safe as a filename stem: no separators, no
/// leading/trailing or repeated dots, only `[A-Za-z0-9._-]` and CJK, at most
/// 64 characters.
pub fn sanitize_stem(value: &str) -> String {
    let replaced = value.replace(['/', '\\'], "-");
    let dots = collapse(&replaced, '.');
    let mapped: String = dots
        .trim_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') || is_cjk(c) {
                c
            } else {
                '-'
            }
        })
        .collect();

    let collapsed = collapse(&mapped, '-');
    let stem = truncate_chars(collapsed.trim_matches('-'), MAX_FILENAME_STEM_LEN)
        .trim_matches(['.', '-']);

    if stem.is_empty() {
        DEFAULT_NAME_SLUG.to_string()
    } else {
        stem.to_string()
    }
}

/// Segments of a configured path with empty, `.`, `..` and `:` segments
/// dropped. `None` when nothing is left.
fn sanitize_segments(raw: &str) -> Option<String> {
    let raw = raw.trim().replace('\\', "/");
    let parts: Vec<&str> = raw
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != "." && *p != ".." && !p.contains(':'))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// The isolation id as a single path segment.
fn isolation_segment(id: &str) -> Option<String> {
    let segment = id.trim().replace(['/', '\\', ':'], "-");
    if segment.is_empty() || segment.chars().all(|c| c == '.') {
        None
    } else {
        Some(segment)
    }
}

fn bucket_destination(bucket: &str, sub_path: Option<String>) -> Result<String, UploadError> {
    if !is_bucket_token(&format!("{}:{}", BUCKET_SCHEME, bucket)) {
        return Err(UploadError::path(format!(
            "'{}' is not a valid bucket name",
            bucket
        )));
    }
    Ok(BucketPath::new(bucket, sub_path.unwrap_or_default()).to_string())
}

/// Filename and base-path rules over one settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FilenameAndPathPolicy<'a> {
    settings: &'a Settings,
}

impl<'a> FilenameAndPathPolicy<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// `{template with name/type/hash}.webp`, sanitized.
    pub fn generate_filename(&self, display_name: &str, kind: EntityKind, field: &str) -> String {
        let name = slugify_name(display_name);
        let name = if name.is_empty() {
            DEFAULT_NAME_SLUG.to_string()
        } else {
            name
        };
        let type_label = type_label_for(kind, field);
        let hash = generate_hash(self.settings.hash_length);

        let raw = self
            .settings
            .naming_template
            .replace("{name}", &name)
            .replace("{type}", type_label)
            .replace("{hash}", &hash);

        format!("{}.{}", sanitize_stem(&raw), CANONICAL_EXTENSION)
    }

    /// Base path for a pair, per the precedence in the module docs.
    pub fn resolve_path(&self, kind: EntityKind, field: &str) -> Result<String, UploadError> {
        let slot = AssetSlot::lookup(kind, field).unwrap_or_else(AssetSlot::fallback);
        let configured = self.settings.path_for(slot);

        if let Some(bucket_path) = parse_bucket_path(configured) {
            return bucket_destination(&bucket_path.bucket, sanitize_segments(&bucket_path.path));
        }

        let base = sanitize_segments(configured).unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());

        if let Some(bucket) = self.settings.selected_bucket() {
            return bucket_destination(bucket, Some(base));
        }

        let prefix = self
            .settings
            .isolation_id
            .as_deref()
            .and_then(isolation_segment)
            .map(|id| format!("{}/{}", ISOLATION_ROOT, id));

        let resolved = match prefix {
            Some(prefix) if base == prefix || base.starts_with(&format!("{}/", prefix)) => base,
            Some(prefix) => format!("{}/{}", prefix, base),
            None => base,
        };

        Ok(resolved.trim_end_matches('/').to_string())
    }

    pub fn resolve(
        &self,
        display_name: &str,
        kind: EntityKind,
        field: &str,
    ) -> Result<ResolvedDestination, UploadError> {
        Ok(ResolvedDestination {
            path: self.resolve_path(kind, field)?,
            filename: self.generate_filename(display_name, kind, field),
        })
    }
}
