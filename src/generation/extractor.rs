use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::models::{FailureKind, GenerateContentResponse, GenerationOutcome, DEFAULT_IMAGE_MIME};

pub const NO_CONTENT: &str = "no content returned";

/// Picks the first inline part that decodes to a non-empty image; falls back to the
/// first non-empty text part (usually a refusal) as the failure reason.
pub fn extract(response: &GenerateContentResponse) -> GenerationOutcome {
    let mut payload_error = None;
    for inline in response.parts().filter_map(|part| part.inline_data.as_ref()) {
        match STANDARD.decode(inline.data.trim()) {
            Ok(image) if !image.is_empty() => {
                let mime_type = inline
                    .mime_type
                    .as_deref()
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or(DEFAULT_IMAGE_MIME);
                return GenerationOutcome::success(image, mime_type);
            }
            Ok(_) => {
                payload_error.get_or_insert_with(|| "image payload was empty".to_string());
            }
            Err(e) => {
                payload_error
                    .get_or_insert_with(|| format!("image payload is not valid base64: {}", e));
            }
        }
    }
    if let Some(reason) = payload_error {
        return GenerationOutcome::failure(FailureKind::TerminalApplication, reason);
    }

    if let Some(text) = response
        .parts()
        .filter_map(|part| part.text.as_deref())
        .find(|text| !text.is_empty())
    {
        return GenerationOutcome::failure(FailureKind::TerminalApplication, text);
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        log::warn!("Prompt blocked by provider: {}", reason);
    }
    GenerationOutcome::failure(FailureKind::TerminalApplication, NO_CONTENT)
}

/// Same as [`extract`], starting from the raw JSON body.
pub fn extract_body(body: &str) -> GenerationOutcome {
    match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => extract(&response),
        Err(e) => GenerationOutcome::failure(
            FailureKind::TerminalApplication,
            format!("unparseable response: {}", e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome_of(value: serde_json::Value) -> GenerationOutcome {
        extract_body(&value.to_string())
    }

    #[test]
    fn test_first_image_wins() {
        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [
            {"text": "Sure, here is the banner"},
            {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}},
            {"inlineData": {"mimeType": "image/png", "data": "BAUG"}}
        ]}}]}));
        assert_eq!(outcome, GenerationOutcome::success(vec![1, 2, 3], "image/jpeg"));
    }

    #[test]
    fn test_image_in_later_candidate() {
        let outcome = outcome_of(json!({"candidates": [
            {"finishReason": "SAFETY"},
            {"content": {"parts": [{"inlineData": {"data": "AQID"}}]}}
        ]}));
        assert_eq!(outcome, GenerationOutcome::success(vec![1, 2, 3], DEFAULT_IMAGE_MIME));
    }

    #[test]
    fn test_text_only_is_terminal() {
        let refusal = "I can't generate images of that. Try a different description.";
        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [{"text": refusal}]}}]}));
        assert_eq!(
            outcome,
            GenerationOutcome::Failure {
                reason: refusal.to_string(),
                retryable: false,
                kind: FailureKind::TerminalApplication,
            }
        );
    }

    #[test]
    fn test_empty_response() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}),
            json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        ] {
            let outcome = outcome_of(body);
            assert_eq!(outcome.reason(), Some(NO_CONTENT));
            assert_eq!(outcome.kind(), Some(FailureKind::TerminalApplication));
        }
    }

    #[test]
    fn test_bad_payloads() {
        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "%%%"}}
        ]}}]}));
        assert!(outcome.reason().unwrap().starts_with("image payload is not valid base64"));

        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": ""}}
        ]}}]}));
        assert_eq!(outcome.reason(), Some("image payload was empty"));

        let outcome = extract_body("not json");
        assert!(outcome.reason().unwrap().starts_with("unparseable response"));
        assert!(matches!(outcome, GenerationOutcome::Failure { retryable: false, .. }));
    }

    #[test]
    fn test_unusable_inline_part_skipped_for_later_image() {
        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": ""}},
            {"inlineData": {"mimeType": "image/webp", "data": "%%%"}},
            {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
        ]}}]}));
        assert_eq!(outcome, GenerationOutcome::success(vec![1, 2, 3], "image/png"));
    }

    #[test]
    fn test_whitespace_text_is_still_a_reason() {
        let outcome = outcome_of(json!({"candidates": [{"content": {"parts": [
            {"text": ""},
            {"text": " "},
            {"text": "later"}
        ]}}]}));
        assert_eq!(outcome.reason(), Some(" "));
    }
}
