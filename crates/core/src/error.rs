//! Error taxonomy.
//!
//! [`ConfigError`] is fatal and raised before any message is accepted.
//! [`AgentExecutionError`] is raised by a single run and is recovered at
//! the handler boundary.

use std::time::Duration;
use thiserror::Error;

/// Boxed error used as the source of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration error raised while building the startup settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential variable is absent or empty.
    #[error("missing credential: {var} is not set or empty")]
    MissingCredential {
        /// Name of the variable that was looked up.
        var: String,
    },
    /// The provider base URL is not an absolute http(s) URL.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The model name is empty.
    #[error("model name must not be empty")]
    EmptyModelName,
}

/// Failure of one agent run against the remote provider.
#[derive(Debug, Error)]
pub enum AgentExecutionError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[source] BoxError),
    /// The provider rejected the credential.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The provider is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Any other non-success HTTP status.
    #[error("provider returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },
    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The run did not complete in time.
    #[error("run timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
}

impl AgentExecutionError {
    /// Whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
