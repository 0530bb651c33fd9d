//! Upload orchestration
//!
//! One call walks `Idle → Validating → Processing → Uploading → Done`. The
//! first failure moves the call to `Failed` and is returned exactly as the
//! failing component produced it.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Instant;

use quickdrop_core::{
    EntityKind, ImageSource, RecordRef, Settings, SettingsSource, TransformSpec, UploadError,
    UploadRequest, UploadResult, UploadResultExt,
};
use quickdrop_processing::{ImageEngine, QualityPolicy};
use quickdrop_storage::StorageRouter;

use crate::policy::FilenameAndPathPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Idle,
    Validating,
    Processing,
    Uploading,
    Done,
    Failed,
}

impl UploadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStage::Idle => "idle",
            UploadStage::Validating => "validating",
            UploadStage::Processing => "processing",
            UploadStage::Uploading => "uploading",
            UploadStage::Done => "done",
            UploadStage::Failed => "failed",
        }
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A request that passed validation.
struct ValidRequest<'r> {
    record: &'r RecordRef,
    kind: EntityKind,
    field: &'r str,
    name: &'r str,
    source: &'r ImageSource,
    transform: Option<&'r TransformSpec>,
}

fn validate(request: &UploadRequest) -> Result<ValidRequest<'_>, UploadError> {
    let record = request
        .record
        .as_ref()
        .filter(|r| !r.id.trim().is_empty())
        .ok_or_else(|| UploadError::invalid_input("A record reference is required"))?;
    let kind = request
        .entity_kind
        .ok_or_else(|| UploadError::invalid_input("An entity kind is required"))?;
    let field = request.field.trim();
    if field.is_empty() {
        return Err(UploadError::invalid_input("A field name is required"));
    }
    let source = request
        .source
        .as_ref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UploadError::invalid_input("An image source is required"))?;

    Ok(ValidRequest {
        record,
        kind,
        field,
        name: request.display_name(),
        source,
        transform: request.transform.as_ref(),
    })
}

/// Tracks the current stage and reports every transition.
struct StageTracker<'o> {
    stage: UploadStage,
    observer: &'o mut (dyn FnMut(UploadStage) + Send),
}

impl<'o> StageTracker<'o> {
    fn new(observer: &'o mut (dyn FnMut(UploadStage) + Send)) -> Self {
        Self {
            stage: UploadStage::Idle,
            observer,
        }
    }

    fn advance(&mut self, next: UploadStage) {
        tracing::debug!(from = %self.stage, to = %next, "Upload stage transition");
        self.stage = next;
        (self.observer)(next);
    }

    /// Move to `Failed` on error, logging the failure under the current stage.
    fn check<T>(&mut self, result: Result<T, UploadError>) -> Result<T, UploadError> {
        let result = result.log_failure(self.stage.as_str());
        if result.is_err() {
            self.advance(UploadStage::Failed);
        }
        result
    }
}

/// Composes the image engine, the naming/path policy and the storage router.
///
/// Collaborators are fixed at construction. Settings are read through the
/// source once per call, so a host may change them between calls.
#[derive(Clone)]
pub struct UploadOrchestrator {
    settings: Arc<dyn SettingsSource>,
    engine: ImageEngine,
    router: StorageRouter,
}

impl UploadOrchestrator {
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        engine: ImageEngine,
        router: StorageRouter,
    ) -> Self {
        Self {
            settings,
            engine,
            router,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    pub fn engine(&self) -> &ImageEngine {
        &self.engine
    }

    pub fn router(&self) -> &StorageRouter {
        &self.router
    }

    /// Run one upload. The record is never modified; the caller applies
    /// `locator` from the result.
    pub async fn execute(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        self.execute_observed(request, &mut |_| {}).await
    }

    /// Same as [`execute`](Self::execute), reporting each stage entered.
    #[tracing::instrument(
        skip(self, request, observer),
        fields(
            kind = ?request.entity_kind,
            field = %request.field,
            operation = "upload_image"
        )
    )]
    pub async fn execute_observed(
        &self,
        request: UploadRequest,
        observer: &mut (dyn FnMut(UploadStage) + Send),
    ) -> Result<UploadResult, UploadError> {
        let start = Instant::now();
        let mut tracker = StageTracker::new(observer);
        let settings = self.settings.snapshot();

        tracker.advance(UploadStage::Validating);
        let valid = tracker.check(validate(&request))?;

        tracker.advance(UploadStage::Processing);
        let encoded = tracker.check(
            self.engine
                .process(
                    valid.source,
                    valid.transform,
                    QualityPolicy::from_settings(&settings),
                    settings.url_origin.as_deref(),
                )
                .await,
        )?;

        tracker.advance(UploadStage::Uploading);
        let policy = FilenameAndPathPolicy::new(&settings);
        let destination = tracker.check(policy.resolve(valid.name, valid.kind, valid.field))?;
        let locator = tracker.check(
            self.router
                .upload(&destination.path, encoded, &destination.filename)
                .await,
        )?;

        tracker.advance(UploadStage::Done);

        tracing::info!(
            record_id = %valid.record.id,
            path = %destination.path,
            filename = %destination.filename,
            locator = %locator.address,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image uploaded"
        );

        Ok(UploadResult {
            locator,
            filename: destination.filename,
            path: destination.path,
        })
    }
}
