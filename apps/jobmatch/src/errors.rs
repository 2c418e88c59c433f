use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Stage-level error taxonomy.
/// Every variant is terminal for a pipeline run; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    // Document stage
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    // Profile stage
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// Carries the sanitized reply verbatim so model drift can be diagnosed.
    #[error("Malformed model output ({reason}): {raw}")]
    MalformedModelOutput { raw: String, reason: String },

    // Job-source stage
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Job API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to write job sink {path}: {reason}")]
    SinkWrite { path: String, reason: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Short machine-readable code, stable across message changes.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            AppError::MalformedModelOutput { .. } => "MALFORMED_MODEL_OUTPUT",
            AppError::FetchFailed { .. } => "FETCH_FAILED",
            AppError::Api { .. } => "API_ERROR",
            AppError::SinkWrite { .. } => "SINK_WRITE",
            AppError::Cancelled => "CANCELLED",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// The raw model reply, when this error is a parse failure.
    pub fn raw_model_output(&self) -> Option<&str> {
        match self {
            AppError::MalformedModelOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// A pipeline stage, as reported in `Failed(stage, error)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DocumentExtraction,
    ProfileExtraction,
    JobDiscovery,
    Matching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DocumentExtraction => "document extraction",
            Stage::ProfileExtraction => "profile extraction",
            Stage::JobDiscovery => "job discovery",
            Stage::Matching => "matching",
        };
        f.write_str(name)
    }
}

/// Error surfaced to callers of the pipeline: which stage failed, and why.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Pipeline failed during {stage}: {error}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub error: AppError,
}

impl PipelineError {
    pub fn new(stage: Stage, error: AppError) -> Self {
        Self { stage, error }
    }
}
