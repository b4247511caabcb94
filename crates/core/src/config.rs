//! Provider, model and run configuration.
//!
//! All three are built once at startup, never mutated, and shared by
//! reference with every run. The provider is held in an [`Arc`] so the
//! model binding and the run config can point at the same credentials.

use crate::ConfigError;
use compact_str::CompactString;
use std::{fmt, sync::Arc};
use url::Url;

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini's OpenAI-compatible endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Credentials and endpoint for the remote model API.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    api_key: String,
    base_url: String,
}

impl ProviderConfig {
    /// Create a provider config, validating the credential and URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        let base_url = base_url.into();

        if api_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                var: "api_key".into(),
            });
        }

        let url = Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(Self { api_key, base_url })
    }

    /// Build from a variable lookup, reading the credential from `var`.
    pub fn from_env(
        env: impl Fn(&str) -> Option<String>,
        var: &str,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = env(var)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential { var: var.into() })?;
        Self::new(api_key, base_url)
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The base URL as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The chat completions endpoint under the base URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Load the provider config for the Gemini endpoint.
///
/// `env` looks up a variable by name; pass `|k| std::env::var(k).ok()` to
/// read the process environment.
pub fn load_provider_config(
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, ConfigError> {
    ProviderConfig::from_env(env, API_KEY_ENV, GEMINI_BASE_URL)
}

/// A named remote model reached through a provider.
#[derive(Debug, Clone)]
pub struct ModelBinding {
    /// Model identifier sent with every request.
    pub model_name: CompactString,
    /// The provider serving this model.
    pub provider: Arc<ProviderConfig>,
}

/// Bind a model name to a provider.
pub fn bind_model(
    name: impl Into<CompactString>,
    provider: Arc<ProviderConfig>,
) -> Result<ModelBinding, ConfigError> {
    let model_name = name.into();
    if model_name.is_empty() {
        return Err(ConfigError::EmptyModelName);
    }
    Ok(ModelBinding {
        model_name,
        provider,
    })
}

/// Settings passed unchanged to every run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The model to run against.
    pub model: ModelBinding,
    /// The run-level provider.
    pub provider: Arc<ProviderConfig>,
    /// Suppress the execution capability's own request tracing.
    pub tracing_disabled: bool,
}

impl RunConfig {
    /// Whether the model binding and the run-level provider carry the same
    /// credentials and endpoint.
    pub fn shares_provider(&self) -> bool {
        Arc::ptr_eq(&self.model.provider, &self.provider) || *self.model.provider == *self.provider
    }
}

/// Bundle a model binding, provider and tracing toggle.
pub fn build_run_config(
    model: ModelBinding,
    provider: Arc<ProviderConfig>,
    tracing_disabled: bool,
) -> RunConfig {
    RunConfig {
        model,
        provider,
        tracing_disabled,
    }
}
