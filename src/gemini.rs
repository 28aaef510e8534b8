//! Client for the Gemini generateContent endpoint.

use crate::config::ApiConfig;
use crate::error::{GENERIC_API_ERROR, NO_SUMMARY_PLACEHOLDER, SummarizeError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One part of a request content
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Content sent to the model
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
}

/// Request body for generateContent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// A single-turn request carrying one text prompt
    pub fn from_prompt(prompt: &str, temperature: f64) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

/// Success body. Every level is optional so incomplete responses still parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if it is non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl GeminiClient {
    /// Create a new client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Endpoint URL, without the credential
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Generate a summary for the prompt.
    ///
    /// A success response without candidate text yields the placeholder
    /// summary instead of an error.
    pub async fn generate_summary(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, SummarizeError> {
        let request = GenerateContentRequest::from_prompt(prompt, self.temperature);

        ::log::debug!(
            "Gemini generate_content: model={} prompt_chars={}",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummarizeError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
            ::log::warn!("Gemini returned {}: {}", status.as_u16(), message);
            return Err(SummarizeError::ApiHttp(message));
        }

        let parsed = match serde_json::from_str::<GenerateContentResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                ::log::warn!("Unparseable Gemini response: {}", e);
                GenerateContentResponse::default()
            }
        };

        match parsed.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                ::log::warn!("Gemini response had no candidate text");
                Ok(NO_SUMMARY_PLACEHOLDER.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    const ENDPOINT_PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest::from_prompt("Summarize me", 0.7);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "Summarize me" }] }],
                "generationConfig": { "temperature": 0.7 }
            })
        );
    }

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"A summary"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("A summary"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.first_text(), None);

        let blank: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#)
                .unwrap();
        assert_eq!(blank.first_text(), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "https://api.example.com/v1beta/".to_string(),
            ..ApiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_summary_success() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path(ENDPOINT_PATH))
            .and(matchers::query_param("key", "test-key"))
            .and(matchers::body_partial_json(serde_json::json!({
                "generationConfig": { "temperature": 0.7 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Short summary." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client_for(&server)
            .generate_summary("test-key", "Give a short summary")
            .await
            .unwrap();
        assert_eq!(summary, "Short summary.");
    }

    #[tokio::test]
    async fn test_rate_limited_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path(ENDPOINT_PATH))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string(r#"{"error":{"message":"rate limited"}}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_summary("test-key", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::ApiHttp(_)));
        assert_eq!(err.to_string(), "rate limited");
    }

    #[tokio::test]
    async fn test_error_without_message_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_summary("test-key", "prompt")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate summary");
    }

    #[tokio::test]
    async fn test_missing_candidates_yields_placeholder() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"candidates":[]}"#))
            .mount(&server)
            .await;

        let summary = client_for(&server)
            .generate_summary("test-key", "prompt")
            .await
            .unwrap();
        assert_eq!(summary, "No summary generated");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ApiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();

        let err = client.generate_summary("test-key", "prompt").await.unwrap_err();
        assert!(matches!(err, SummarizeError::Network(_)));
    }
}
