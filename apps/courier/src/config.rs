//! Courier configuration loaded from TOML.

use crate::utils::{env_reference, expand_env_vars};
use anyhow::{Context, Result};
use ccore::{
    API_KEY_ENV, ConfigError, DEFAULT_AGENT_NAME, DEFAULT_INSTRUCTIONS, DEFAULT_MODEL,
    GEMINI_BASE_URL, ProviderConfig,
};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Config file looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "courier.toml";

/// Default gateway bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default per-run timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Top-level configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Remote provider credentials and endpoint.
    pub provider: ProviderSection,
    /// Model selection.
    pub model: ModelSection,
    /// Per-run settings.
    pub run: RunSection,
    /// The agent messages are forwarded to.
    pub agent: AgentSection,
    /// WebSocket gateway settings.
    pub server: ServerSection,
}

/// `[provider]` section.
///
/// Both fields may reference environment variables as `${VAR}`; they are
/// expanded when the provider is resolved, not when the file is parsed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// API key, usually `${GEMINI_API_KEY}`.
    pub api_key: String,
    /// OpenAI-compatible base URL.
    pub base_url: String,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            api_key: format!("${{{API_KEY_ENV}}}"),
            base_url: GEMINI_BASE_URL.into(),
        }
    }
}

/// `[model]` section.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Model identifier sent with every request.
    pub name: CompactString,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.into(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Suppress the per-run request trace events.
    pub tracing_disabled: bool,
    /// Seconds a run may take. `0` disables the limit.
    pub timeout_secs: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            tracing_disabled: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RunSection {
    /// The run timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// `[agent]` section.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Agent name.
    pub name: CompactString,
    /// System instructions.
    pub instructions: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.into(),
            instructions: DEFAULT_INSTRUCTIONS.into(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address the gateway listens on.
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
        }
    }
}

impl CourierConfig {
    /// Parse a TOML string into a `CourierConfig`.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load from `path` if given, else from [`CONFIG_FILE`] in the working
    /// directory if it exists, else fall back to the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.exists() {
                    tracing::debug!("no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                local
            }
        };
        let config = Self::load(&path)?;
        tracing::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the provider, expanding `${VAR}` references through `env`.
    ///
    /// A key that is exactly one `${VAR}` reference is read the same way
    /// as [`load_provider_config`](ccore::load_provider_config), so a
    /// missing credential names the variable.
    pub fn provider(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ProviderConfig, ConfigError> {
        let base_url = expand_env_vars(&self.provider.base_url, &env);
        match env_reference(&self.provider.api_key) {
            Some(var) => ProviderConfig::from_env(&env, var, base_url),
            None => ProviderConfig::new(expand_env_vars(&self.provider.api_key, &env), base_url),
        }
    }
}
