//! Language-model gateway.
//!
//! Turns a user request into the raw text of a command by calling an
//! OpenAI-compatible chat-completion endpoint. The returned text has its
//! code fence stripped but is not parsed here.

mod prompt;

pub use prompt::{SYSTEM_PROMPT, strip_code_fence};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no API key configured; set one with `scenegpt key set <KEY>`")]
    Auth,

    #[error("completion API returned {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("unexpected completion response: {0}")]
    InvalidResponse(String),
}

/// Anything that can turn a request into raw command text.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn send(&self, request_text: &str, api_key: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Wire format of the completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Gateway for `POST {base_url}/chat/completions` with bearer auth.
pub struct OpenAIGateway {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAIGateway {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, request_text: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request_text.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    async fn post(&self, api_key: &str, body: &CompletionRequest) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await
            .map_err(GatewayError::Network)?;

        let status = response.status();
        let text = response.text().await.map_err(GatewayError::Network)?;
        if !status.is_success() {
            return Err(GatewayError::Transport {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionGateway for OpenAIGateway {
    async fn send(&self, request_text: &str, api_key: &str) -> Result<String, GatewayError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GatewayError::Auth);
        }

        let body = self.build_request(request_text);
        debug!("Completion request to {} ({} chars)", self.model, request_text.len());

        let raw = tokio::time::timeout(self.timeout, self.post(api_key, &body))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;
        debug!("Completion response: {}", raw);

        extract_content(&raw)
    }
}

/// Pull `choices[0].message.content` out of a response body and clean it.
pub fn extract_content(body: &str) -> Result<String, GatewayError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".to_string()))?
        .message
        .content
        .unwrap_or_default();

    Ok(strip_code_fence(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn gateway(base_url: &str) -> OpenAIGateway {
        OpenAIGateway::new(&ProviderConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..ProviderConfig::default()
        })
    }

    #[tokio::test]
    async fn returns_cleaned_completion() {
        let seen = Arc::new(std::sync::Mutex::new(None::<(String, Value)>));
        let seen_in_handler = seen.clone();
        let router = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap, axum::Json(body): axum::Json<Value>| {
                let seen = seen_in_handler.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *seen.lock().unwrap() = Some((auth, body));
                    axum::Json(json!({
                        "choices": [{"message": {"role": "assistant",
                            "content": "```json\n{\"action\":\"create_object\"}\n```"}}]
                    }))
                }
            }),
        );
        let base = serve(router).await;

        let text = gateway(&base).send("make a cube", "sk-test").await.unwrap();
        assert_eq!(text, "{\"action\":\"create_object\"}");

        let (auth, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "make a cube");
        assert!(body["max_tokens"].is_u64());
        assert!(body["temperature"].is_number());
    }

    #[tokio::test]
    async fn empty_key_fails_before_any_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_handler = hits.clone();
        let router = Router::new().route(
            "/chat/completions",
            post(move || {
                hits_in_handler.fetch_add(1, Ordering::SeqCst);
                async { "{}" }
            }),
        );
        let base = serve(router).await;

        let err = gateway(&base).send("make a cube", "   ").await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn error_status_carries_code_and_body() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base = serve(router).await;

        let err = gateway(&base).send("make a cube", "sk-bad").await.unwrap_err();
        match &err {
            GatewayError::Transport { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid api key"));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let base = serve(router).await;

        let mut gw = gateway(&base);
        gw.timeout = Duration::from_millis(100);
        let err = gw.send("make a cube", "sk-test").await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
    }

    #[test]
    fn missing_choices_is_invalid() {
        assert!(matches!(
            extract_content(r#"{"choices": []}"#),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn null_content_is_empty_text() {
        let text = extract_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(text, "");
    }
}
