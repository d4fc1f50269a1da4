//! Chat-completions REST client
//!
//! Gantree: L5_Suggest → Client

use crate::auth::{AuthError, SuggesterCredentials};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use qcgen_core::constants::suggest::MAX_HTTP_RETRIES;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Longest wait honoured from a `retry-after` header
const MAX_RETRY_WAIT_SECS: u64 = 30;

/// Wait before retrying an unavailable service
const UNAVAILABLE_WAIT_SECS: u64 = 5;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API error response
    #[error("API error ({code}): {message}")]
    ApiError {
        /// HTTP status code
        code: u16,
        /// Error message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Endpoint could not be built from the base URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Completion carried no content
    #[error("Completion contained no message content")]
    EmptyResponse,

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited {
        /// Seconds to wait before retry
        retry_after: u64,
    },

    /// Service unavailable
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
}

// ============================================================================
// Request Types
// ============================================================================

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// Request
    User,
    /// Model reply
    Assistant,
}

/// Image reference inside a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    /// `https://` or `data:` URL
    pub url: String,
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text part
    Text {
        /// Text body
        text: String,
    },
    /// Image part
    ImageUrl {
        /// Image reference
        image_url: ImageUrl,
    },
}

/// Message body: plain text or parts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Text and image parts
    Parts(Vec<ContentPart>),
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Body
    pub content: MessageContent,
}

impl ChatMessage {
    /// System message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message carrying an inline image followed by text
    pub fn user_with_image(text: impl Into<String>, mime: &str, image: &[u8]) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data_url(mime, image),
                    },
                },
                ContentPart::Text { text: text.into() },
            ]),
        }
    }
}

/// `data:<mime>;base64,<payload>`
pub fn image_data_url(mime: &str, image: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(image))
}

/// `{"type": "json_object"}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    /// Format name
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    /// Force a JSON object reply
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Chat-completions request body
/// Gantree: ChatRequest // 요청 본문
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model name
    pub model: String,
    /// Conversation
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Reply format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Reply length cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Empty request for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: 0.1,
            response_format: None,
            max_tokens: None,
        }
    }

    /// Append a message
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Append a system message
    pub fn system(self, text: impl Into<String>) -> Self {
        self.message(ChatMessage::system(text))
    }

    /// Append a user message
    pub fn user(self, text: impl Into<String>) -> Self {
        self.message(ChatMessage::user(text))
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask for a JSON object reply
    pub fn json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat::json_object());
        self
    }

    /// Cap the reply length
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Chat-completions response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Candidate replies
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate reply
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Reply message
    pub message: ResponseMessage,
}

/// Reply message
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, trimmed, if non-empty
    pub fn first_content(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Chat-completions API client
/// Gantree: ChatClient // HTTP 클라이언트
#[derive(Clone)]
pub struct ChatClient {
    /// HTTP client
    client: reqwest::Client,

    /// Credentials
    credentials: SuggesterCredentials,

    /// `<base_url>/chat/completions`
    endpoint: Url,
}

impl ChatClient {
    /// Create new client with credentials
    pub fn new(credentials: SuggesterCredentials) -> Result<Self, ClientError> {
        credentials.validate()?;

        let endpoint = chat_endpoint(credentials.base_url())?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&credentials.auth_header())
                .map_err(|_| AuthError::InvalidKeyFormat)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("qcgen-suggest/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            credentials,
            endpoint,
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self, ClientError> {
        let credentials = SuggesterCredentials::from_env()?;
        Self::new(credentials)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Send one request and return the first reply's text
    /// Gantree: complete(&ChatRequest) -> Result<String> // 단일 요청
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, ClientError> {
        log::debug!(
            "chat completion: model={} messages={}",
            request.model,
            request.messages.len()
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let body: ChatResponse = self.handle_response(response).await?;
        body.first_content().ok_or(ClientError::EmptyResponse)
    }

    /// `complete` with bounded retries on rate limiting and outages
    /// Gantree: complete_with_retry(&ChatRequest, usize) -> Result<String> // 재시도
    pub async fn complete_with_retry(
        &self,
        request: &ChatRequest,
        max_retries: usize,
    ) -> Result<String, ClientError> {
        let mut retries = 0;
        loop {
            match self.complete(request).await {
                Ok(result) => return Ok(result),
                Err(ClientError::RateLimited { retry_after }) => {
                    if retries >= max_retries {
                        return Err(ClientError::RateLimited { retry_after });
                    }
                    retries += 1;
                    let wait = retry_after.min(MAX_RETRY_WAIT_SECS);
                    log::warn!("rate limited, retrying in {}s ({}/{})", wait, retries, max_retries);
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Err(ClientError::ServiceUnavailable) => {
                    if retries >= max_retries {
                        return Err(ClientError::ServiceUnavailable);
                    }
                    retries += 1;
                    log::warn!("service unavailable, retrying ({}/{})", retries, max_retries);
                    tokio::time::sleep(Duration::from_secs(UNAVAILABLE_WAIT_SECS)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(ClientError::from)
        } else {
            match status.as_u16() {
                401 => Err(ClientError::Auth(AuthError::AuthFailed(
                    "Invalid or revoked API key".to_string(),
                ))),
                429 => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(MAX_RETRY_WAIT_SECS);
                    Err(ClientError::RateLimited { retry_after })
                }
                503 => Err(ClientError::ServiceUnavailable),
                code => {
                    let text = response.text().await.unwrap_or_default();
                    Err(ClientError::ApiError {
                        code,
                        message: text,
                    })
                }
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get credentials
    pub fn credentials(&self) -> &SuggesterCredentials {
        &self.credentials
    }

    /// Get endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

// ============================================================================
// Completion Seam
// ============================================================================

/// Anything that can answer a chat request with text
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Model used for text requests
    fn text_model(&self) -> &str;

    /// Model used for image requests
    fn vision_model(&self) -> &str;

    /// Send the request, retrying transient failures
    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError>;
}

#[async_trait]
impl ChatCompletion for ChatClient {
    fn text_model(&self) -> &str {
        self.credentials.model()
    }

    fn vision_model(&self) -> &str {
        self.credentials.vision_model()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        self.complete_with_retry(request, MAX_HTTP_RETRIES).await
    }
}

/// `<base>/chat/completions`, tolerating a trailing slash on `base`
pub fn chat_endpoint(base_url: &str) -> Result<Url, url::ParseError> {
    let root = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    root.join("chat/completions")
}
