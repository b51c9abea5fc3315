//! Azure OpenAI provider implementation.
//!
//! Requests go to a named deployment:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! with the key in the `api-key` header.

use super::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};
use async_trait::async_trait;
use narrative_common::config::ProviderConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

const PROVIDER_NAME: &str = "azure-openai";

/// Longest slice of an error body kept in a [`ProviderError`].
const MAX_ERROR_BODY: usize = 500;

/// Azure OpenAI chat completions provider.
pub struct AzureOpenAIProvider {
    client: reqwest::Client,
    deployment: String,
    url: Url,
}

impl AzureOpenAIProvider {
    /// Create a provider for one deployment.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: &str,
    ) -> Result<Self, ProviderError> {
        let config_error = |message: String| ProviderError {
            provider: PROVIDER_NAME.into(),
            model: deployment.to_string(),
            message,
            status_code: None,
        };

        let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))
            .map_err(|e| config_error(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let mut url = base
            .join(&format!(
                "openai/deployments/{}/chat/completions",
                deployment
            ))
            .map_err(|e| config_error(format!("Invalid deployment '{}': {}", deployment, e)))?;
        url.query_pairs_mut().append_pair("api-version", api_version);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| config_error("API key contains invalid header characters".into()))?;
        key.set_sensitive(true);
        headers.insert("api-key", key);

        // Only the connect phase is bounded; a slow completion is allowed to finish.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            deployment: deployment.to_string(),
            url,
        })
    }

    /// Create from configuration. Returns `Ok(None)` when settings are incomplete.
    pub fn from_config(config: &ProviderConfig) -> Result<Option<Self>, ProviderError> {
        match (&config.endpoint, &config.api_key, &config.deployment) {
            (Some(endpoint), Some(api_key), Some(deployment)) => {
                Self::new(endpoint, api_key, deployment, &config.api_version).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Fully-qualified chat completions URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn error(&self, message: String, status_code: Option<u16>) -> ProviderError {
        ProviderError {
            provider: PROVIDER_NAME.into(),
            model: self.deployment.clone(),
            message,
            status_code,
        }
    }
}

#[async_trait]
impl Provider for AzureOpenAIProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.deployment
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let start = Instant::now();

        let mut messages: Vec<AzureMessage> = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(AzureMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| AzureMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        }));

        let body = AzureRequest {
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_mode.then(|| ResponseFormat {
                kind: "json_object".into(),
            }),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(format!("Request failed: {}", e), None))?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(
                format!("API error: {}", error_detail(&text)),
                Some(status.as_u16()),
            ));
        }

        let azure_response: AzureResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {}", e), None))?;

        let choice = azure_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| self.error("Response contained no choices".into(), None))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                self.error(
                    format!(
                        "Empty completion (finish_reason: {})",
                        choice.finish_reason.as_deref().unwrap_or("unknown")
                    ),
                    None,
                )
            })?;

        let usage = azure_response.usage.map_or(TokenUsage::default(), |u| TokenUsage {
            input_tokens: u.prompt_tokens.unwrap_or(0),
            output_tokens: u.completion_tokens.unwrap_or(0),
            total_tokens: u.total_tokens.unwrap_or(0),
        });

        Ok(ChatResponse {
            provider: PROVIDER_NAME.into(),
            model: azure_response.model.unwrap_or_else(|| self.deployment.clone()),
            content,
            usage,
            finish_reason: choice.finish_reason,
            latency_ms,
        })
    }
}

/// Pull `error.message` out of an Azure error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<AzureErrorBody>(body) {
        return parsed.error.message;
    }

    let mut detail = body.trim().to_string();
    if detail.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| detail.is_char_boundary(i))
            .unwrap_or(0);
        detail.truncate(cut);
        detail.push('…');
    }
    detail
}

// ============================================================================
// Azure API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AzureRequest {
    messages: Vec<AzureMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct AzureMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct AzureResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<AzureUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureUsage {
    prompt_tokens: Option<i64>,
    completion_tokens: Option<i64>,
    total_tokens: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    error: AzureErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AzureErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHAT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

    fn provider_for(server: &MockServer) -> AzureOpenAIProvider {
        AzureOpenAIProvider::new(&server.uri(), "test-key", "gpt-4o", "2024-02-01").unwrap()
    }

    fn stage_request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![Message::user("Some text")],
            max_tokens: Some(4096),
            temperature: Some(0.0),
            system: Some("Be precise".into()),
            json_mode: true,
        }
    }

    #[test]
    fn test_deployment_url() {
        let provider = AzureOpenAIProvider::new(
            "https://example.openai.azure.com/",
            "key",
            "gpt-4o",
            "2024-02-01",
        )
        .unwrap();

        assert_eq!(
            provider.url().as_str(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(provider.name(), "azure-openai");
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = AzureOpenAIProvider::new("not a url", "key", "gpt-4o", "2024-02-01");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_incomplete_config_is_none() {
        let config = ProviderConfig::default();
        assert!(AzureOpenAIProvider::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = AzureRequest {
            messages: vec![
                AzureMessage {
                    role: "system".into(),
                    content: "Be precise".into(),
                },
                AzureMessage {
                    role: "user".into(),
                    content: "Text".into(),
                },
            ],
            max_tokens: Some(4096),
            temperature: Some(0.0),
            response_format: Some(ResponseFormat {
                kind: "json_object".into(),
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn test_response_with_null_content_deserializes() {
        let json = r#"{
            "choices": [{
                "message": {"role": "assistant", "content": null},
                "finish_reason": "content_filter"
            }]
        }"#;
        let resp: AzureResponse = serde_json::from_str(json).unwrap();
        assert!(resp.choices[0].message.content.is_none());
        assert!(resp.usage.is_none());
    }

    #[test]
    fn test_error_detail_extracts_message() {
        let body = r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#;
        assert_eq!(
            error_detail(body),
            "Access denied due to invalid subscription key."
        );
    }

    #[test]
    fn test_error_detail_truncates_raw_body() {
        let body = "x".repeat(2000);
        let detail = error_detail(&body);
        assert!(detail.len() <= MAX_ERROR_BODY + '…'.len_utf8());
        assert!(detail.ends_with('…'));
    }

    #[tokio::test]
    async fn test_chat_sends_deployment_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(query_param("api-version", "2024-02-01"))
            .and(header("api-key", "test-key"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "Be precise"},
                    {"role": "user", "content": "Some text"}
                ],
                "max_tokens": 4096,
                "temperature": 0.0,
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-2024-05-13",
                "choices": [{
                    "message": {"role": "assistant", "content": "{\"omissions\": []}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider_for(&server).chat(stage_request()).await.unwrap();

        assert_eq!(response.provider, "azure-openai");
        assert_eq!(response.model, "gpt-4o-2024-05-13");
        assert_eq!(response.content, "{\"omissions\": []}");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 8);
        assert_eq!(response.usage.total_tokens, 128);
    }

    #[tokio::test]
    async fn test_chat_error_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "401", "message": "Access denied due to invalid subscription key."}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).chat(stage_request()).await.unwrap_err();

        assert_eq!(err.status_code, Some(401));
        assert_eq!(err.provider, "azure-openai");
        assert_eq!(err.model, "gpt-4o");
        assert!(err.message.contains("Access denied due to invalid subscription key."));
    }

    #[tokio::test]
    async fn test_chat_without_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server).chat(stage_request()).await.unwrap_err();
        assert!(err.message.contains("no choices"), "{}", err);
        assert_eq!(err.status_code, None);
    }

    #[tokio::test]
    async fn test_chat_null_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": null},
                    "finish_reason": "content_filter"
                }]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).chat(stage_request()).await.unwrap_err();
        assert!(err.message.contains("content_filter"), "{}", err);
    }
}
