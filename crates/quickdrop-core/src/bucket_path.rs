//! Bucket-path grammar
//!
//! A bucket destination is written `s3:bucket` or `s3:bucket/sub/path`, with an
//! optional `//` after the scheme (`s3://bucket/sub/path`). The scheme is
//! case-insensitive and backslashes are read as forward slashes.
//!
//! This is the only place the grammar is defined. Path resolution, path
//! normalization and the storage router all go through [`parse_bucket_path`].

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::BUCKET_SCHEME;

static BUCKET_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^s3:(?://)?([^/]+)(?:/(.*))?$").expect("bucket path pattern is valid")
});

static BUCKET_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^s3:[A-Za-z0-9][A-Za-z0-9._-]*$").expect("bucket token pattern is valid")
});

/// A parsed bucket destination. `path` is empty when no sub-path was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    pub bucket: String,
    pub path: String,
}

impl BucketPath {
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
        }
    }
}

impl Display for BucketPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.path.is_empty() {
            write!(f, "{}:{}", BUCKET_SCHEME, self.bucket)
        } else {
            write!(f, "{}:{}/{}", BUCKET_SCHEME, self.bucket, self.path)
        }
    }
}

/// Parse `s3:bucket[/path]` or `s3://bucket[/path]`.
///
/// Returns `None` when the input is not a bucket destination. The sub-path is
/// returned as written (trailing slashes trimmed); callers sanitize it.
pub fn parse_bucket_path(raw: &str) -> Option<BucketPath> {
    let normalized = raw.trim().replace('\\', "/");
    let captures = BUCKET_PATH.captures(&normalized)?;
    let bucket = captures.get(1)?.as_str().trim();
    if bucket.is_empty() {
        return None;
    }
    let path = captures
        .get(2)
        .map(|m| m.as_str().trim_end_matches('/'))
        .unwrap_or("");
    Some(BucketPath::new(bucket, path))
}

/// Whether a single path segment is a `s3:bucket-name` token.
pub fn is_bucket_token(segment: &str) -> bool {
    BUCKET_TOKEN.is_match(segment)
}
