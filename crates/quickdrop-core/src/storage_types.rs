use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend kinds
///
/// Used both as the storage-source selector in [`Settings`](crate::Settings)
/// and as the tag on a [`StorageLocator`](crate::StorageLocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Directory-tree store that needs folders created before writes
    #[default]
    Hierarchical,
    /// Object store addressed by bucket name plus key
    Bucket,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hierarchical" | "data" | "local" => Ok(BackendKind::Hierarchical),
            "bucket" | "s3" => Ok(BackendKind::Bucket),
            _ => Err(anyhow::anyhow!("Invalid storage source: {}", s)),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BackendKind::Hierarchical => write!(f, "hierarchical"),
            BackendKind::Bucket => write!(f, "bucket"),
        }
    }
}
