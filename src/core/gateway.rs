//! Completion gateway: request formatting, the HTTP round-trip, and
//! classification of whatever comes back.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::constants::SYSTEM_DIRECTIVE;
use crate::core::message::{Role, Turn};

/// Outcome of one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success(String),
    /// The service answered with a structured error.
    ApiError(String),
    /// Network failure, timeout, or a payload we could not make sense of.
    TransportError(String),
}

impl CompletionResult {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionResult::Success(_) => "success",
            CompletionResult::ApiError(_) => "api_error",
            CompletionResult::TransportError(_) => "transport_error",
        }
    }
}

impl fmt::Display for CompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionResult::Success(text) => f.write_str(text),
            CompletionResult::ApiError(message) => write!(f, "Error: {message}"),
            CompletionResult::TransportError(detail) => write!(f, "Transport error: {detail}"),
        }
    }
}

/// Anything that can turn a history snapshot into a completion.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, history: &[Turn]) -> CompletionResult;

    fn model_id(&self) -> &str;
}

fn api_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

/// Build the request body for `history`.
///
/// The directive is glued onto the first turn's text on every call; the
/// endpoint is stateless so each request carries it again.
pub fn build_request(directive: &str, history: &[Turn]) -> GenerateContentRequest {
    let first_text = history.first().map(|turn| turn.text.as_str()).unwrap_or("");
    let mut contents = Vec::with_capacity(history.len().max(1));
    contents.push(Content::text("user", format!("{directive}{first_text}")));
    contents.extend(
        history
            .iter()
            .skip(1)
            .map(|turn| Content::text(api_role(turn.role), turn.text.clone())),
    );
    GenerateContentRequest { contents }
}

/// Classify a raw response body.
pub fn decode_response(body: &str) -> CompletionResult {
    let response: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(err) => {
            return CompletionResult::TransportError(format!("malformed response payload: {err}"))
        }
    };

    if let Some(text) = response.first_text() {
        return CompletionResult::Success(text.trim().to_string());
    }

    if let Some(error) = response.error {
        let message = error
            .message
            .filter(|text| !text.trim().is_empty())
            .or(error.status)
            .or_else(|| error.code.map(|code| format!("error code {code}")))
            .unwrap_or_else(|| "unknown error".to_string());
        return CompletionResult::ApiError(message);
    }

    CompletionResult::TransportError("response contained neither candidates nor error".to_string())
}

pub fn endpoint_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model.trim_matches('/')
    )
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

pub struct GeminiGateway {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    directive: String,
}

impl GeminiGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            url: endpoint_url(&settings.base_url, &settings.model),
            model: settings.model,
            api_key: settings.api_key,
            directive: SYSTEM_DIRECTIVE.to_string(),
        })
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    async fn round_trip(&self, history: &[Turn]) -> CompletionResult {
        let request = build_request(&self.directive, history);
        debug!(model = %self.model, contents = request.contents.len(), "sending completion request");

        let response = match self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return CompletionResult::TransportError("request timed out".to_string())
            }
            Err(err) => return CompletionResult::TransportError(err.without_url().to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return CompletionResult::TransportError(format!(
                    "failed to read response body (HTTP {status}): {}",
                    err.without_url()
                ))
            }
        };

        match decode_response(&body) {
            CompletionResult::TransportError(detail) if !status.is_success() => {
                CompletionResult::TransportError(format!("HTTP {status}: {detail}"))
            }
            result => result,
        }
    }
}

#[async_trait]
impl CompletionGateway for GeminiGateway {
    async fn complete(&self, history: &[Turn]) -> CompletionResult {
        let start = Instant::now();
        let result = self.round_trip(history).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            CompletionResult::Success(text) => info!(
                model = %self.model,
                duration_ms = %duration_ms,
                chars = text.chars().count(),
                "completion succeeded"
            ),
            failure => warn!(
                model = %self.model,
                duration_ms = %duration_ms,
                kind = failure.kind(),
                detail = %failure,
                "completion failed"
            ),
        }
        result
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
