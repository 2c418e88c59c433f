//! Reply sanitizer: strips the wrapping models put around JSON replies.
//!
//! Rule order matters and is fixed:
//! 1. trim surrounding whitespace
//! 2. strip a code fence present at BOTH ends
//! 3. strip a leading `json` language tag (case-insensitive)
//!
//! The result is what gets parsed, and what gets reported verbatim when
//! parsing fails.

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

pub fn sanitize_reply(raw: &str) -> &str {
    let text = raw.trim();
    let text = strip_fences(text);
    strip_language_tag(text)
}

/// A reply that is only fence characters (e.g. a bare "```") has nothing
/// inside and sanitizes to "".
fn strip_fences(text: &str) -> &str {
    if !(text.starts_with(FENCE) && text.ends_with(FENCE)) {
        return text;
    }
    text.get(FENCE.len()..text.len() - FENCE.len())
        .unwrap_or("")
        .trim()
}

fn strip_language_tag(text: &str) -> &str {
    match text.get(..LANGUAGE_TAG.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LANGUAGE_TAG) => {
            text[LANGUAGE_TAG.len()..].trim()
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_reply_with_tag() {
        let input = "```json\n{\"Name\":\"A\"}\n```";
        assert_eq!(sanitize_reply(input), "{\"Name\":\"A\"}");
    }

    #[test]
    fn test_fenced_reply_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(sanitize_reply(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_uppercase_tag_is_stripped() {
        let input = "```JSON\n{\"key\": 1}\n```";
        assert_eq!(sanitize_reply(input), "{\"key\": 1}");
    }

    #[test]
    fn test_bare_tag_without_fences_is_stripped() {
        assert_eq!(sanitize_reply("  Json {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_only_at_start_is_kept() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(sanitize_reply(input), input);
    }

    #[test]
    fn test_bare_fence_is_empty() {
        assert_eq!(sanitize_reply("```"), "");
        assert_eq!(sanitize_reply(" ```` "), "");
        assert_eq!(sanitize_reply("``````"), "");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(sanitize_reply("\n\n {\"a\": 1} \t\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_clean_reply_is_unchanged() {
        let clean = "{\"name\": \"A\", \"skills\": [\"Go\"]}";
        assert_eq!(sanitize_reply(clean), clean);
    }

    #[test]
    fn test_sanitize_is_idempotent_on_clean_output() {
        let inputs = [
            "```json\n{\"a\": 1}\n```",
            "```\n[1, 2]\n```",
            "json {\"b\": true}",
            "not json",
            "```",
            "{}",
        ];
        for input in inputs {
            let once = sanitize_reply(input);
            assert_eq!(sanitize_reply(once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_non_ascii_reply_does_not_panic() {
        assert_eq!(sanitize_reply("résumé"), "résumé");
        assert_eq!(sanitize_reply("é"), "é");
    }
}
