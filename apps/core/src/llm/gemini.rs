use crate::error::AppError;
use crate::llm::traits::LlmClient;
use crate::models::{GenerationConfig, ModelTurn, SafetySetting, TurnRole};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

// --- Constants ---
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";
const API_KEY_HEADER: &str = "x-goog-api-key";

// --- Wire types ---
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Serialize)]
struct Content<'a> {
    role: TurnRole,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Client for Gemini's `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Builds a client. `timeout` bounds each HTTP request and is the only
    /// timeout applied to a relay call.
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("GEMINI_API_KEY is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, payload: &GenerateContentRequest<'_>) -> Result<reqwest::RequestBuilder, AppError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| AppError::Config(format!("Invalid GEMINI_API_KEY: {}", e)))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(self.client.post(self.endpoint()).headers(headers).json(payload))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        turns: &[ModelTurn],
        config: &GenerationConfig,
    ) -> Result<String, AppError> {
        info!("Gemini generating with {} turns (model {})", turns.len(), self.model);

        let payload = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
            generation_config: WireGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
            safety_settings: &config.safety_settings,
        };

        let res = self.build_request(&payload)?.send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Gemini request failed with status {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Malformed Gemini response: {}", e)))?;

        extract_text(body)
    }
}

fn extract_text(body: GenerateContentResponse) -> Result<String, AppError> {
    let Some(candidate) = body.candidates.into_iter().next() else {
        let reason = body
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AppError::Llm(format!("Gemini returned no answer: {}", reason)));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(AppError::Llm(format!(
            "Gemini returned an empty answer (finish reason: {})",
            reason
        )));
    }

    debug!("Gemini answered with {} chars", text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            DEFAULT_MODEL.to_string(),
            format!("{}/v1beta/", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn history() -> Vec<ModelTurn> {
        vec![
            ModelTurn {
                role: TurnRole::Model,
                text: "Hello!".to_string(),
            },
            ModelTurn {
                role: TurnRole::User,
                text: "What is the leave policy?".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_generate_sends_history_and_parameters() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [
                    {"role": "model", "parts": [{"text": "Hello!"}]},
                    {"role": "user", "parts": [{"text": "What is the leave policy?"}]}
                ],
                "generationConfig": {"temperature": 0.6, "maxOutputTokens": 300},
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE"},
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE"},
                    {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE"},
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Employees get "}, {"text": "20 days."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = client_for(&mock_server)
            .generate(&history(), &GenerationConfig::default())
            .await;

        // 3. Assert
        assert_eq!(result.unwrap(), "Employees get 20 days.");
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .generate(&history(), &GenerationConfig::default())
            .await;

        match result {
            Err(AppError::Llm(err_msg)) => {
                assert!(err_msg.contains("status 429"));
                assert!(err_msg.contains("Resource has been exhausted"));
            }
            other => panic!("Expected AppError::Llm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .generate(&history(), &GenerationConfig::default())
            .await;

        match result {
            Err(AppError::Llm(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("Expected AppError::Llm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .generate(&history(), &GenerationConfig::default())
            .await;
        assert!(matches!(result, Err(AppError::Llm(msg)) if msg.contains("Malformed")));
    }

    #[test]
    fn test_empty_api_key_is_config_error() {
        let result = GeminiClient::new(
            "  ".to_string(),
            DEFAULT_MODEL.to_string(),
            DEFAULT_API_BASE.to_string(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GeminiClient::new(
            "k".to_string(),
            "gemini-1.5-flash".to_string(),
            "https://example.test/v1beta/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
