//! Configuration module
//!
//! [`Settings`] is the read-only key/value configuration the pipeline works
//! from. Hosts hand the pipeline a [`SettingsSource`]; each upload call takes
//! exactly one snapshot and uses it for every stage.

use std::collections::HashMap;
use std::env;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPRESS_QUALITY, DEFAULT_HASH_LENGTH, DEFAULT_NAMING_TEMPLATE, MAX_COMPRESS_QUALITY,
    MAX_HASH_LENGTH, MIN_COMPRESS_QUALITY, MIN_HASH_LENGTH,
};
use crate::models::AssetSlot;
use crate::storage_types::BackendKind;

const ENV_PREFIX: &str = "QUICKDROP_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Compression
    pub compress_enabled: bool,
    /// 0.1 to 1.0 in steps of 0.1
    pub compress_quality: f32,
    // Naming
    /// Template with `{name}`, `{type}` and `{hash}` placeholders
    pub naming_template: String,
    /// 4 to 16
    pub hash_length: usize,
    // Paths
    /// Per-slot base path; may be a `s3:bucket/...` destination
    pub paths: HashMap<AssetSlot, String>,
    pub storage_source: BackendKind,
    pub bucket_name: Option<String>,
    /// World/tenant id; hierarchical paths are placed under `worlds/{id}/`
    pub isolation_id: Option<String>,
    /// Base URL relative image URLs are resolved against
    pub url_origin: Option<String>,
    // Backends
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub known_buckets: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compress_enabled: true,
            compress_quality: DEFAULT_COMPRESS_QUALITY,
            naming_template: DEFAULT_NAMING_TEMPLATE.to_string(),
            hash_length: DEFAULT_HASH_LENGTH,
            paths: HashMap::new(),
            storage_source: BackendKind::Hierarchical,
            bucket_name: None,
            isolation_id: None,
            url_origin: None,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_region: None,
            s3_endpoint: None,
            known_buckets: Vec::new(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Load settings from `QUICKDROP_*` environment variables (and `.env`).
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Settings::default();

        let storage_source = match env_var("STORAGE_SOURCE") {
            Some(raw) => raw.parse::<BackendKind>()?,
            None => defaults.storage_source,
        };

        let paths = AssetSlot::ALL
            .into_iter()
            .filter_map(|slot| env_var(slot.env_key()).map(|path| (slot, path)))
            .collect();

        let settings = Settings {
            compress_enabled: env_var("COMPRESS_ENABLED")
                .map(|v| v.to_lowercase())
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.compress_enabled),
            compress_quality: env_var("COMPRESS_QUALITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.compress_quality),
            naming_template: env_var("NAMING_TEMPLATE").unwrap_or(defaults.naming_template),
            hash_length: env_var("HASH_LENGTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.hash_length),
            paths,
            storage_source,
            bucket_name: env_var("BUCKET_NAME"),
            isolation_id: env_var("WORLD_ID"),
            url_origin: env_var("URL_ORIGIN"),
            local_storage_path: env_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_var("LOCAL_STORAGE_BASE_URL"),
            s3_region: env_var("S3_REGION").or_else(|| env::var("AWS_REGION").ok()),
            s3_endpoint: env_var("S3_ENDPOINT"),
            known_buckets: env_var("KNOWN_BUCKETS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        settings.validate()?;
        Ok(settings.normalized())
    }

    /// Reject settings that cannot be clamped into something usable.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.naming_template.trim().is_empty() {
            return Err(anyhow::anyhow!("Naming template must not be empty"));
        }
        if !self.naming_template.contains("{hash}") {
            tracing::warn!(
                template = %self.naming_template,
                "Naming template has no {{hash}} placeholder; filenames may collide"
            );
        }
        if !self.compress_quality.is_finite() {
            return Err(anyhow::anyhow!("Compression quality must be a number"));
        }
        if self.storage_source == BackendKind::Bucket
            && self.bucket_name.as_deref().map_or(true, |b| b.trim().is_empty())
        {
            tracing::warn!("Bucket storage selected without a bucket name; using hierarchical paths");
        }
        Ok(())
    }

    /// Clamp numeric values into their documented ranges.
    pub fn normalized(mut self) -> Self {
        self.compress_quality = clamp_quality(self.compress_quality);
        self.hash_length = self.hash_length.clamp(MIN_HASH_LENGTH, MAX_HASH_LENGTH);
        self
    }

    /// Configured base path for a slot, or the slot's default.
    pub fn path_for(&self, slot: AssetSlot) -> &str {
        self.paths
            .get(&slot)
            .map(String::as_str)
            .unwrap_or_else(|| slot.default_path())
    }

    pub fn with_path(mut self, slot: AssetSlot, path: impl Into<String>) -> Self {
        self.paths.insert(slot, path.into());
        self
    }

    /// Bucket name, when bucket mode is selected and a name is configured.
    pub fn selected_bucket(&self) -> Option<&str> {
        if self.storage_source != BackendKind::Bucket {
            return None;
        }
        self.bucket_name
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

/// Clamp to `[0.1, 1.0]` and round to the nearest 0.1 step.
pub fn clamp_quality(quality: f32) -> f32 {
    if !quality.is_finite() {
        return DEFAULT_COMPRESS_QUALITY;
    }
    let clamped = quality.clamp(MIN_COMPRESS_QUALITY, MAX_COMPRESS_QUALITY);
    (clamped * 10.0).round() / 10.0
}

/// Read-only access to the current settings.
pub trait SettingsSource: Send + Sync {
    fn snapshot(&self) -> Settings;
}

impl SettingsSource for Settings {
    fn snapshot(&self) -> Settings {
        self.clone().normalized()
    }
}

/// Lets a host change settings between calls while in-flight calls keep the
/// snapshot they started with.
impl SettingsSource for RwLock<Settings> {
    fn snapshot(&self) -> Settings {
        match self.read() {
            Ok(guard) => guard.clone().normalized(),
            Err(poisoned) => poisoned.into_inner().clone().normalized(),
        }
    }
}
