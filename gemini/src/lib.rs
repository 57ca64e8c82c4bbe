//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for the `generateContent` endpoint with:
//! - Plain text completions with an optional system instruction
//! - Structured JSON output constrained by a response schema
//! - Inline image extraction for image-capable models

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const JSON_MIME_TYPE: &str = "application/json";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Create a client from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Result<Self, Error> {
        API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
            .map(Self::new)
            .ok_or(Error::NoApiKey)
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model used when a request does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a `generateContent` request and return the first candidate.
    pub async fn generate(&self, request: Request) -> Result<Response, Error> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = build_api_request(&request);
        let headers = self.build_headers()?;

        tracing::debug!(model = %model, structured = request.response_schema.is_some(), "gemini request");

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(parse_response(api_response, model))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME_TYPE));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

fn build_api_request(request: &Request) -> ApiRequest {
    let contents = request
        .contents
        .iter()
        .map(|c| ApiContent {
            role: Some(c.role.as_str().to_string()),
            parts: c.parts.iter().map(|p| p.into()).collect(),
        })
        .collect();

    let system_instruction = request.system.as_ref().map(|system| ApiContent {
        role: None,
        parts: vec![ApiPart {
            text: Some(system.clone()),
            inline_data: None,
        }],
    });

    let generation_config = if request.response_schema.is_some() || request.temperature.is_some() {
        Some(ApiGenerationConfig {
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| JSON_MIME_TYPE.to_string()),
            response_schema: request.response_schema.clone(),
            temperature: request.temperature,
        })
    } else {
        None
    };

    ApiRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

fn parse_response(api_response: ApiResponse, requested_model: String) -> Response {
    let candidate = api_response.candidates.into_iter().next();

    let finish_reason = candidate
        .as_ref()
        .and_then(|c| c.finish_reason.as_deref())
        .map(|reason| match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" | "PROHIBITED_CONTENT" | "IMAGE_SAFETY" => FinishReason::Safety,
            _ => FinishReason::Other,
        })
        .unwrap_or(FinishReason::Other);

    let parts = candidate
        .and_then(|c| c.content)
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| match (p.text, p.inline_data) {
            (_, Some(data)) => Some(Part::Image(InlineImage {
                mime_type: data.mime_type,
                data: data.data,
            })),
            (Some(text), None) => Some(Part::Text { text }),
            (None, None) => None,
        })
        .collect();

    let usage = api_response.usage_metadata.unwrap_or_default();

    Response {
        model: api_response.model_version.unwrap_or(requested_model),
        parts,
        finish_reason,
        usage: Usage {
            prompt_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        },
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A `generateContent` request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub system: Option<String>,
    pub contents: Vec<Content>,
    /// When set, the model must answer with JSON matching this schema.
    pub response_schema: Option<serde_json::Value>,
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a new request with the given contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            model: None,
            system: None,
            contents,
            response_schema: None,
            temperature: None,
        }
    }

    /// Create a single-turn request from a user prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(vec![Content::user(text)])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// The author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }
}

/// A piece of content within a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text { text: String },
    Image(InlineImage),
}

impl Part {
    /// Extract text from a Text part.
    pub fn as_text(&self) -> Option<&str> {
        if let Part::Text { text } = self {
            Some(text)
        } else {
            None
        }
    }
}

/// Base64 image bytes returned inline by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Render as a `data:` URI suitable for an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The first candidate of a `generateContent` response.
#[derive(Debug, Clone)]
pub struct Response {
    pub model: String,
    pub parts: Vec<Part>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl Response {
    /// Get all text content concatenated.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// The first inline image, if the model produced one.
    pub fn first_image(&self) -> Option<&InlineImage> {
        self.parts.iter().find_map(|part| match part {
            Part::Image(image) => Some(image),
            Part::Text { .. } => None,
        })
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub output_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData>,
}

impl From<&Part> for ApiPart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text { text } => ApiPart {
                text: Some(text.clone()),
                inline_data: None,
            },
            Part::Image(image) => ApiPart {
                text: None,
                inline_data: Some(ApiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ApiInlineData>,
    /// Thinking models mark their reasoning parts.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Response {
        let api: ApiResponse = serde_json::from_value(value).unwrap();
        parse_response(api, "requested".to_string())
    }

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, API_BASE);
    }

    #[test]
    fn test_client_with_model_and_base_url() {
        let client = Gemini::new("test-key")
            .with_model("gemini-2.5-flash-image")
            .with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(client.model(), "gemini-2.5-flash-image");
        assert_eq!(client.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_request_builder() {
        let request = Request::prompt("Hello")
            .with_system("You are a teacher")
            .with_temperature(0.7)
            .with_response_schema(json!({"type": "OBJECT"}));

        assert_eq!(request.contents.len(), 1);
        assert!(request.system.is_some());
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn test_structured_request_wire_format() {
        let request = Request::prompt("Make a challenge")
            .with_system("Be kind")
            .with_response_schema(json!({"type": "OBJECT"}));

        let wire = serde_json::to_value(build_api_request(&request)).unwrap();
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["contents"][0]["parts"][0]["text"], "Make a challenge");
        assert_eq!(wire["systemInstruction"]["parts"][0]["text"], "Be kind");
        assert!(wire["systemInstruction"].get("role").is_none());
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let wire = serde_json::to_value(build_api_request(&Request::prompt("Draw a cat"))).unwrap();
        assert!(wire.get("generationConfig").is_none());
        assert!(wire.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let response = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4},
            "modelVersion": "gemini-3-flash-preview"
        }));

        assert_eq!(response.text(), "{\"a\":1}");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.model, "gemini-3-flash-preview");
        assert_eq!(response.usage.prompt_tokens, 12);
        assert!(response.first_image().is_none());
    }

    #[test]
    fn test_parse_image_response() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your picture"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                ]}
            }]
        }));

        let image = response.first_image().unwrap();
        assert_eq!(image.to_data_uri(), "data:image/png;base64,AAAA");
        assert_eq!(response.model, "requested");
        assert_eq!(response.finish_reason, FinishReason::Other);
    }

    #[test]
    fn test_parse_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "let me think", "thought": true},
                    {"text": "answer"}
                ]}
            }]
        }));
        assert_eq!(response.text(), "answer");
    }

    #[test]
    fn test_parse_empty_response() {
        let response = parse(json!({}));
        assert!(response.parts.is_empty());
        assert_eq!(response.text(), "");
    }
}
