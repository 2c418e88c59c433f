//! Profile extraction: résumé text in, `CandidateProfile` out, via one
//! language-model call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::models::CandidateProfile;

pub mod fields;
pub mod prompts;
pub mod sanitize;

pub use sanitize::sanitize_reply;

use prompts::{build_profile_prompt, PROFILE_SYSTEM};

pub struct ProfileExtractor {
    model: Arc<dyn ChatModel>,
}

impl ProfileExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Invokes the model exactly once and parses its reply.
    ///
    /// Model failures surface as `ModelUnavailable`; unparseable replies as
    /// `MalformedModelOutput` with the sanitized text attached.
    pub async fn extract(&self, cv_text: &str) -> Result<CandidateProfile, AppError> {
        let prompt = build_profile_prompt(cv_text);

        info!(
            "Requesting profile extraction from model {} ({} chars of CV text)",
            self.model.model_name(),
            cv_text.len()
        );

        let reply = self
            .model
            .complete(&prompt, PROFILE_SYSTEM)
            .await
            .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;

        let profile = parse_profile_reply(&reply)?;
        info!(
            "Extracted profile: position='{}', location='{}', {} skills",
            profile.desired_position,
            profile.preferred_location,
            profile.skills.len()
        );
        Ok(profile)
    }
}

/// Sanitizes, parses and maps a raw model reply.
pub fn parse_profile_reply(raw: &str) -> Result<CandidateProfile, AppError> {
    let text = sanitize_reply(raw);

    let parsed: Value = serde_json::from_str(text).map_err(|e| {
        warn!("Model reply is not valid JSON: {e}");
        AppError::MalformedModelOutput {
            raw: text.to_string(),
            reason: e.to_string(),
        }
    })?;

    match parsed {
        Value::Object(object) => Ok(fields::profile_from_object(&object)),
        other => Err(AppError::MalformedModelOutput {
            raw: text.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
