//! Gemini `generateContent` request and response types.
//!
//! Only the fields the classifier sends or reads are modelled.
//!
//! See: <https://ai.google.dev/api/generate-content>

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use swipe_core::CapturedImage;

/// Request body: one user turn holding the prompt and the image.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

impl<'a> GenerateRequest<'a> {
    /// Pair `prompt` with the base64-encoded `image`.
    pub fn new(prompt: &'a str, image: &CapturedImage) -> Self {
        Self {
            contents: [Content {
                parts: [
                    RequestPart::Text { text: prompt },
                    RequestPart::Image {
                        inline_data: InlineData {
                            mime_type: CapturedImage::MIME_TYPE,
                            data: STANDARD.encode(image.as_bytes()),
                        },
                    },
                ],
            }],
        }
    }
}

/// Successful response body.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    /// Model candidates; the classifier reads the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One model candidate.
#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    /// Missing when the candidate was blocked.
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

/// Content of a candidate.
#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    /// Response parts; only text parts are read.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// One response part.
#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    /// Text, absent for non-text parts.
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Details of a service error.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Canonical status, e.g. `"RESOURCE_EXHAUSTED"`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorResponse {
    /// Describe the error from a raw body, falling back to the body itself.
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(Self {
                error: ErrorDetail {
                    message,
                    status: Some(status),
                },
            }) => format!("{status}: {message}"),
            Ok(Self { error }) => error.message,
            Err(_) => body.trim().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn request_carries_prompt_and_inline_png() {
        let image = CapturedImage::new(vec![1, 2, 3]);
        let body = serde_json::to_value(GenerateRequest::new("describe", &image))
            .expect("serialise request");

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"text": "describe"},
                        {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
                    ]
                }]
            })
        );
    }

    #[rstest]
    fn response_text_joins_first_candidate_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"age\": "}, {"text": "\"30\"}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .expect("deserialise response");

        assert_eq!(response.text().as_deref(), Some("{\"age\": \"30\"}"));
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"candidates": []}))]
    #[case(json!({"candidates": [{"finishReason": "SAFETY"}]}))]
    #[case(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}))]
    fn blocked_or_blank_responses_have_no_text(#[case] raw: serde_json::Value) {
        let response: GenerateResponse = serde_json::from_value(raw).expect("deserialise");
        assert!(response.text().is_none());
    }

    #[rstest]
    #[case(
        r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#,
        "RESOURCE_EXHAUSTED: Quota exceeded"
    )]
    #[case(r#"{"error": {"message": "Bad key"}}"#, "Bad key")]
    #[case("upstream unavailable\n", "upstream unavailable")]
    fn error_bodies_are_described(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(ErrorResponse::describe(body), expected);
    }
}
