//! Error types module
//!
//! Every stage of the upload pipeline reports failures through [`UploadError`].
//! The orchestrator never rewraps these: the kind and message a component
//! produced is exactly what the caller receives.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad input the caller can fix
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error, so hosts can map it onto their own surface
/// (HTTP status, notification, exit code) without matching on variants.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "DECODE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request could succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailure(String),

    #[error("Invalid upload path: {0}")]
    PathValidationFailure(String),

    #[error("Upload failed: {0}")]
    BackendUploadFailure(String),

    /// Directory creation failed for a reason other than the directory
    /// already existing.
    #[error("Could not create directory: {0}")]
    DirectoryCreateFailure(String),
}

impl UploadError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        UploadError::InvalidInput(msg.into())
    }

    pub fn unsupported_source(msg: impl Into<String>) -> Self {
        UploadError::UnsupportedSource(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        UploadError::DecodeFailure(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        UploadError::EncodeFailure(msg.into())
    }

    pub fn path(msg: impl Into<String>) -> Self {
        UploadError::PathValidationFailure(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        UploadError::BackendUploadFailure(msg.into())
    }
}

fn upload_error_static_metadata(
    err: &UploadError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        UploadError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the request fields and try again"),
            LogLevel::Debug,
        ),
        UploadError::UnsupportedSource(_) => (
            "UNSUPPORTED_SOURCE",
            false,
            Some("Use a local file or an http(s), data or blob URL"),
            LogLevel::Debug,
        ),
        UploadError::DecodeFailure(_) => (
            "DECODE_FAILURE",
            true,
            Some("Check the image file or URL and try again"),
            LogLevel::Warn,
        ),
        UploadError::EncodeFailure(_) => ("ENCODE_FAILURE", false, None, LogLevel::Error),
        UploadError::PathValidationFailure(_) => (
            "PATH_VALIDATION_FAILURE",
            false,
            Some("Fix the configured base path"),
            LogLevel::Warn,
        ),
        UploadError::BackendUploadFailure(_) => (
            "BACKEND_UPLOAD_FAILURE",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        UploadError::DirectoryCreateFailure(_) => (
            "DIRECTORY_CREATE_FAILURE",
            true,
            Some("Check storage permissions"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }
}

/// Attach a stage name to a failure in logs without changing the error.
pub trait UploadResultExt<T> {
    fn log_failure(self, stage: &'static str) -> Result<T, UploadError>;
}

impl<T> UploadResultExt<T> for Result<T, UploadError> {
    fn log_failure(self, stage: &'static str) -> Result<T, UploadError> {
        if let Err(ref err) = self {
            match err.log_level() {
                LogLevel::Debug => {
                    tracing::debug!(stage, code = err.error_code(), error = %err, "Upload stage failed")
                }
                LogLevel::Warn => {
                    tracing::warn!(stage, code = err.error_code(), error = %err, "Upload stage failed")
                }
                LogLevel::Error => {
                    tracing::error!(stage, code = err.error_code(), error = %err, "Upload stage failed")
                }
            }
        }
        self
    }
}
