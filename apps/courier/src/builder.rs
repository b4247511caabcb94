//! Build the message handler from configuration.

use crate::CourierConfig;
use ccore::{ConfigError, Handler, bind_model, build_run_config, define_agent};
use model::{Client, OpenAIRunner};
use std::sync::Arc;

/// Build a handler backed by the OpenAI-compatible provider.
///
/// Resolves the provider, binds the model, builds the run config and
/// defines the agent, in that order. Any error aborts startup.
pub fn build_handler(
    config: &CourierConfig,
    env: impl Fn(&str) -> Option<String>,
    client: Client,
) -> Result<Handler<OpenAIRunner>, ConfigError> {
    let provider = Arc::new(config.provider(env)?);
    let model = bind_model(config.model.name.clone(), Arc::clone(&provider))?;
    let run = build_run_config(model, provider, config.run.tracing_disabled);
    let agent = define_agent(config.agent.name.clone(), config.agent.instructions.clone());

    let handler = Handler::new(OpenAIRunner::new(client), agent, run);
    Ok(match config.run.timeout() {
        Some(limit) => handler.with_timeout(limit),
        None => handler,
    })
}
