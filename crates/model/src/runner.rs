//! Runner implementation for OpenAI-compatible providers.

use crate::{HttpProvider, Request};
use ccore::{Agent, AgentExecutionError, RunConfig, RunResult, Runner};
use reqwest::Client;

/// Runs agents against the provider of the configured model binding.
///
/// Each run is a single chat completions request. Holds nothing but the
/// HTTP client, so one instance serves any number of concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct OpenAIRunner {
    client: Client,
}

impl OpenAIRunner {
    /// Create a runner on top of a shared HTTP client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Runner for OpenAIRunner {
    async fn run(
        &self,
        agent: &Agent,
        input: &str,
        config: &RunConfig,
    ) -> Result<RunResult, AgentExecutionError> {
        let provider = &config.model.provider;
        let endpoint = provider.endpoint();
        let http = HttpProvider::bearer(self.client.clone(), provider.api_key(), &endpoint)
            .map_err(|e| AgentExecutionError::Auth(format!("unusable credential: {e}")))?;

        let request = Request::for_run(agent, input, &config.model);
        if !config.tracing_disabled {
            tracing::debug!(
                agent = %agent.name,
                model = %request.model,
                %endpoint,
                "starting run"
            );
        }

        let response = http.send(&request).await?;
        if !config.tracing_disabled {
            tracing::debug!(
                id = %response.meta.id,
                finish_reason = ?response.reason(),
                usage = ?response.usage,
                "run completed"
            );
        }
        response.final_output().map(RunResult::new)
    }
}
