use crate::config::AppConfig;
use crate::error::{UpstreamError, UpstreamResult};
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> UpstreamResult<String>;
}

pub struct GeminiService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build Gemini HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            }),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiService {
    async fn generate(&self, prompt: &str) -> UpstreamResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::ConfigurationMissing("GEMINI_API_KEY".to_string()))?;

        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::UpstreamTransportFailure(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        extract_answer(gemini_response)
    }
}

/// Joins the text parts of the first candidate. An answer with no text is
/// treated as a malformed response.
pub fn extract_answer(response: GeminiResponse) -> UpstreamResult<String> {
    let answer = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if answer.trim().is_empty() {
        return Err(UpstreamError::UpstreamResponseMalformed(
            "Gemini response has no text in its first candidate".to_string(),
        ));
    }

    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/gemini-test:generateContent";

    fn service_for(server: &MockServer, timeout: Duration) -> GeminiService {
        let config = AppConfig {
            gemini_api_key: Some("test-key".to_string()),
            gemini_model: "gemini-test".to_string(),
            upstream_timeout: timeout,
            ..AppConfig::default()
        };
        GeminiService::new(&config).unwrap().with_base_url(server.uri())
    }

    fn parse(value: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extracts_first_candidate_text() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Person Y " }, { "text": "is the president." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));

        assert_eq!(extract_answer(response).unwrap(), "Person Y is the president.");
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));

        assert!(matches!(
            extract_answer(response),
            Err(UpstreamError::UpstreamResponseMalformed(_))
        ));
    }

    #[test]
    fn test_candidate_without_content_is_malformed() {
        let response = parse(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }));

        assert!(matches!(
            extract_answer(response),
            Err(UpstreamError::UpstreamResponseMalformed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let service = GeminiService::new(&AppConfig::default()).unwrap();

        let result = service.generate("hello").await;

        assert!(matches!(result, Err(UpstreamError::ConfigurationMissing(_))));
    }

    #[test]
    fn test_request_carries_generation_settings() {
        let config = AppConfig {
            temperature: 0.7,
            max_output_tokens: 512,
            ..AppConfig::default()
        };
        let service = GeminiService::new(&config).unwrap();

        let request = service.build_request("What is 2+2?");

        assert_eq!(request.contents[0].parts[0].text, "What is 2+2?");
        let generation = request.generation_config.unwrap();
        assert_eq!(generation.max_output_tokens, 512);
        assert!((generation.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_generate_posts_prompt_with_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "4" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = service_for(&server, Duration::from_secs(5)).generate("What is 2+2?").await;

        assert_eq!(answer.unwrap(), "4");
    }

    #[tokio::test]
    async fn test_unauthorized_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let result = service_for(&server, Duration::from_secs(5)).generate("hello").await;

        match result {
            Err(UpstreamError::UpstreamTransportFailure(message)) => assert!(message.contains("401")),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": "x" })))
            .mount(&server)
            .await;

        let result = service_for(&server, Duration::from_secs(5)).generate("hello").await;

        assert!(matches!(result, Err(UpstreamError::UpstreamResponseMalformed(_))));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_as_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "candidates": [{ "content": { "parts": [{ "text": "late" }] } }] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let result = service_for(&server, Duration::from_millis(200)).generate("hello").await;

        assert!(matches!(result, Err(UpstreamError::UpstreamTransportFailure(_))));
    }
}
