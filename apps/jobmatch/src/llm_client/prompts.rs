// Shared prompt fragments.
// Each module that calls the model keeps its own prompts.rs alongside it;
// this file only holds cross-cutting pieces.

/// System prompt fragment that asks for JSON-only output.
///
/// Models still wrap replies in fences or prefix a `json` tag now and then;
/// the profile reply sanitizer handles both.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";
