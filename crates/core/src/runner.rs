//! Agent execution capability.

use crate::{Agent, AgentExecutionError, RunConfig, RunResult};
use std::future::Future;

/// Executes one run of an agent against one input.
///
/// Uses RPITIT, no dyn dispatch. The HTTP implementation lives in
/// `courier-model`; tests use deterministic stubs.
pub trait Runner: Send + Sync {
    /// Run `agent` on `input` with `config` and return the final output.
    fn run(
        &self,
        agent: &Agent,
        input: &str,
        config: &RunConfig,
    ) -> impl Future<Output = Result<RunResult, AgentExecutionError>> + Send;
}
