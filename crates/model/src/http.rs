//! HTTP transport for OpenAI-compatible chat completions.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-built headers and the
//! endpoint URL, and maps transport and status failures onto
//! [`AgentExecutionError`].

use crate::Response;
use ccore::AgentExecutionError;
use reqwest::{
    Client, Method, StatusCode,
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};

/// Shared HTTP transport for OpenAI-compatible providers.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth: HeaderValue = format!("Bearer {key}").parse()?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Send a non-streaming request and deserialize the response.
    pub async fn send(&self, body: &impl Serialize) -> Result<Response, AgentExecutionError> {
        if let Ok(body) = serde_json::to_string(body) {
            tracing::trace!("request: {}", body);
        }
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| AgentExecutionError::Network(e.into()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentExecutionError::Network(e.into()))?;
        tracing::trace!("response ({status}): {text}");

        if !status.is_success() {
            return Err(classify(status, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| AgentExecutionError::MalformedResponse(format!("{e}: {}", excerpt(&text))))
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Map a non-success status onto an execution error.
///
/// Gemini rejects a bad key with 400 `INVALID_ARGUMENT` rather than 401,
/// so that case is classified as an auth failure too.
fn classify(status: StatusCode, body: &str) -> AgentExecutionError {
    let detail = error_detail(body);
    let mut message = detail.message;
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("no details").to_owned();
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentExecutionError::Auth(message),
        StatusCode::BAD_REQUEST
            if detail.status.as_deref() == Some("INVALID_ARGUMENT")
                && message.contains("API key") =>
        {
            AgentExecutionError::Auth(message)
        }
        StatusCode::TOO_MANY_REQUESTS => AgentExecutionError::RateLimited(message),
        status => AgentExecutionError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini wraps the envelope in a single-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorWire {
    One(ErrorEnvelope),
    Many(Vec<ErrorEnvelope>),
}

/// The provider's error message and status name.
struct ErrorDetail {
    message: String,
    status: Option<String>,
}

/// Extract the provider's error, falling back to the raw body.
fn error_detail(body: &str) -> ErrorDetail {
    let envelope = match serde_json::from_str::<ErrorWire>(body) {
        Ok(ErrorWire::One(envelope)) => Some(envelope),
        Ok(ErrorWire::Many(list)) => list.into_iter().next(),
        Err(_) => None,
    };
    match envelope {
        Some(ErrorEnvelope { error }) => ErrorDetail {
            message: error.message,
            status: error.status,
        },
        None => ErrorDetail {
            message: excerpt(body).to_owned(),
            status: None,
        },
    }
}

/// The first 200 characters of a body, trimmed.
fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(200) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
