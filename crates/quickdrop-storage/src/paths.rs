//! Path and filename rules shared by both backend families.

use quickdrop_core::constants::{BUCKET_SCHEME, DEFAULT_FILENAME};
use quickdrop_core::{is_bucket_token, parse_bucket_path, BucketPath, UploadError};

/// Normalize a destination path.
///
/// Backslashes become `/`, then the path is split into segments. Input with a
/// `..` segment is rejected outright; empty and `.` segments are dropped. A
/// `:` is only allowed in a leading `s3:bucket` token, and only when
/// `allow_empty` is false (bucket sub-paths never carry a token of their own).
///
/// With `allow_empty` an empty result is `""`; otherwise it is an error.
pub fn normalize_path(raw: &str, allow_empty: bool) -> Result<String, UploadError> {
    let raw = raw.trim().replace('\\', "/");

    if raw.split('/').any(|segment| segment.trim() == "..") {
        return Err(UploadError::path(format!(
            "'{}' contains a parent directory segment",
            raw
        )));
    }

    if !allow_empty {
        if let Some(bucket_path) = parse_bucket_path(&raw) {
            if !is_bucket_token(&format!("{}:{}", BUCKET_SCHEME, bucket_path.bucket)) {
                return Err(UploadError::path(format!(
                    "'{}' is not a valid bucket name",
                    bucket_path.bucket
                )));
            }
            let sub_path = normalize_path(&bucket_path.path, true)?;
            return Ok(BucketPath::new(bucket_path.bucket, sub_path).to_string());
        }
    }

    let mut segments = Vec::new();
    for segment in raw.split('/').map(str::trim) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment.contains(':') {
            return Err(UploadError::path(format!(
                "segment '{}' in '{}' contains ':'",
                segment, raw
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        if allow_empty {
            return Ok(String::new());
        }
        return Err(UploadError::path("path is empty"));
    }

    Ok(segments.join("/"))
}

/// Make `filename` safe to use as a single path component.
pub fn sanitize_filename(filename: &str) -> String {
    let mut cleaned = String::with_capacity(filename.len());
    for c in filename.chars() {
        let c = if c == '/' || c == '\\' { '-' } else { c };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }

    let cleaned = cleaned.trim().trim_matches('.').trim();
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}
