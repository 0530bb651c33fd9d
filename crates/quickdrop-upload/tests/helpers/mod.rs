//! Test helpers: in-memory backends, fixtures and an orchestrator builder.
//!
//! Run from workspace root: `cargo test -p quickdrop-upload --test upload_flow_test`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use std::sync::Arc;

use quickdrop_core::Settings;
use quickdrop_processing::ImageEngine;
use quickdrop_storage::StorageRouter;
use quickdrop_upload::UploadOrchestrator;

use storage::{MockBucketStore, MockDirectoryStore};

/// Orchestrator over fresh mock backends, plus handles to inspect them.
pub struct TestPipeline {
    pub orchestrator: UploadOrchestrator,
    pub directories: Arc<MockDirectoryStore>,
    pub buckets: Arc<MockBucketStore>,
}

pub fn setup_pipeline(settings: Settings) -> TestPipeline {
    let directories = Arc::new(MockDirectoryStore::new());
    let buckets = Arc::new(MockBucketStore::new());

    let router = StorageRouter::new()
        .with_hierarchical(directories.clone())
        .with_bucket(buckets.clone());

    TestPipeline {
        orchestrator: UploadOrchestrator::new(Arc::new(settings), ImageEngine::new(), router),
        directories,
        buckets,
    }
}

/// Route test logs through the test writer; repeated calls are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("quickdrop=debug")
        .with_test_writer()
        .try_init();
}
