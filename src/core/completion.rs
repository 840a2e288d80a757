use async_trait::async_trait;
use reqwest::StatusCode;
use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::api::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, MAX_TOKENS};
use crate::core::constants::{APP_ORIGIN, APP_TITLE, SYSTEM_PROMPT};
use crate::core::resolver::ResolvedModel;
use crate::utils::url::construct_api_url;

/// Failure of a single completion round-trip, classified from the HTTP status
/// and the parsed body.
#[derive(Debug)]
pub enum CompletionError {
    /// Upstream answered 429.
    RateLimited { detail: Option<String> },
    /// Any other non-2xx status.
    Http { status: u16, detail: String },
    /// The request never produced a response.
    Network(reqwest::Error),
    /// 2xx whose body lacks `choices[0].message.content`.
    MalformedResponse(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::RateLimited { detail: Some(detail) } => {
                write!(f, "API Error (429): {detail}")
            }
            CompletionError::RateLimited { detail: None } => {
                write!(f, "API Error (429): rate limit exceeded")
            }
            CompletionError::Http { status, detail } => write!(f, "API Error ({status}): {detail}"),
            CompletionError::Network(err) => write!(f, "Network error: {err}"),
            CompletionError::MalformedResponse(reason) => {
                write!(f, "Invalid response format from AI model: {reason}")
            }
        }
    }
}

impl Error for CompletionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompletionError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl CompletionError {
    fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message().map(str::to_string));

        if status == StatusCode::TOO_MANY_REQUESTS {
            return CompletionError::RateLimited { detail };
        }

        let detail = detail
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());
        CompletionError::Http {
            status: status.as_u16(),
            detail,
        }
    }
}

/// Builds the outbound payload: system prompt, then prior history, then the new user turn.
pub fn build_request(
    model: &ResolvedModel,
    history: Vec<ChatMessage>,
    user_content: &str,
    temperature: f32,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.extend(history);
    messages.push(ChatMessage::new("user", user_content));

    ChatRequest {
        model: model.id.clone(),
        messages,
        temperature,
        max_tokens: MAX_TOKENS,
        stream: false,
    }
}

/// Sends one non-streaming completion request and returns the assistant text.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        model: &ResolvedModel,
        request: &ChatRequest,
    ) -> Result<String, CompletionError>;
}

#[derive(Clone, Default)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionTransport for HttpCompletionClient {
    async fn complete(
        &self,
        model: &ResolvedModel,
        request: &ChatRequest,
    ) -> Result<String, CompletionError> {
        let chat_url = construct_api_url(&model.base_url, "chat/completions");
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            url = %chat_url,
            "sending completion request"
        );

        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", model.api_key))
            .header("HTTP-Referer", APP_ORIGIN)
            .header("X-Title", APP_TITLE)
            .json(request)
            .send()
            .await
            .map_err(CompletionError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::Network)?;

        if !status.is_success() {
            return Err(CompletionError::from_status(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| CompletionError::MalformedResponse(err.to_string()))?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| {
                CompletionError::MalformedResponse("response contained no message content".into())
            })
    }
}
