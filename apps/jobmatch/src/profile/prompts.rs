// Profile extraction prompt templates.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const PROFILE_SYSTEM: &str = JSON_ONLY_SYSTEM;

/// Replace `{cv_text}` before sending.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"The following text is extracted from a CV:

{cv_text}

Please extract the following details in JSON format:
- name
- email
- desired_position
- preferred_location
- skills (list of strings)
- years_of_experience (number)
- education (list of strings)
- key_achievements (list of strings)
- professional_summary
- work_history (list of strings)

Use exactly these keys. Omit a key when the CV does not state it; do not guess."#;

pub fn build_profile_prompt(cv_text: &str) -> String {
    PROFILE_PROMPT_TEMPLATE.replace("{cv_text}", cv_text)
}
