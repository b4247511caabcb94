//! Message handler.
//!
//! One inbound message in, one reply out. The only suspension point is the
//! runner call; nothing mutable is shared between invocations, so any
//! number of them may be in flight at once.

use crate::{
    Agent, AgentExecutionError, InboundMessage, OutboundMessage, RunConfig, Runner,
};
use std::{sync::Arc, time::Duration};

/// Forward one message to the agent and reply with its final output.
///
/// A failed run never escapes: it is logged and turned into a failure
/// reply for the same conversation.
pub async fn handle_message<R: Runner>(
    runner: &R,
    msg: InboundMessage,
    agent: &Agent,
    cfg: &RunConfig,
) -> OutboundMessage {
    let result = forward(runner, &msg, agent, cfg, None).await;
    into_reply(msg, result)
}

/// The run, optionally bounded by a timeout. Failures are logged here.
async fn forward<R: Runner>(
    runner: &R,
    msg: &InboundMessage,
    agent: &Agent,
    cfg: &RunConfig,
    timeout: Option<Duration>,
) -> Result<OutboundMessage, AgentExecutionError> {
    let run = runner.run(agent, &msg.content, cfg);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .unwrap_or(Err(AgentExecutionError::Timeout(limit))),
        None => run.await,
    };
    match result {
        Ok(result) => Ok(OutboundMessage::answer(
            msg.conversation.clone(),
            result.final_output,
        )),
        Err(e) => {
            tracing::warn!(
                conversation = %msg.conversation,
                agent = %agent.name,
                "agent run failed: {e}"
            );
            Err(e)
        }
    }
}

fn into_reply(
    msg: InboundMessage,
    result: Result<OutboundMessage, AgentExecutionError>,
) -> OutboundMessage {
    match result {
        Ok(reply) => reply,
        Err(e) => OutboundMessage::failure(msg.conversation, failure_text(&e)),
    }
}

/// User-visible text for a failed run.
fn failure_text(e: &AgentExecutionError) -> String {
    format!("Sorry, I couldn't answer that: {e}")
}

/// The startup settings bundled for concurrent use.
///
/// Cloning is cheap; every clone shares the same runner, agent and
/// run config.
#[derive(Debug)]
pub struct Handler<R> {
    runner: Arc<R>,
    agent: Arc<Agent>,
    config: Arc<RunConfig>,
    timeout: Option<Duration>,
}

impl<R: Runner> Handler<R> {
    /// Create a handler without a timeout.
    pub fn new(runner: R, agent: Agent, config: RunConfig) -> Self {
        Self {
            runner: Arc::new(runner),
            agent: Arc::new(agent),
            config: Arc::new(config),
            timeout: None,
        }
    }

    /// Bound each run by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The agent messages are forwarded to.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The run config passed to every run.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the agent on `msg` and surface a failure as an error.
    ///
    /// The failure is already logged when this returns.
    pub async fn run(&self, msg: &InboundMessage) -> Result<OutboundMessage, AgentExecutionError> {
        forward(
            self.runner.as_ref(),
            msg,
            &self.agent,
            &self.config,
            self.timeout,
        )
        .await
    }

    /// Run the agent on `msg`, always producing a reply.
    pub async fn handle(&self, msg: InboundMessage) -> OutboundMessage {
        let result = self.run(&msg).await;
        into_reply(msg, result)
    }
}

impl<R> Clone for Handler<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            agent: Arc::clone(&self.agent),
            config: Arc::clone(&self.config),
            timeout: self.timeout,
        }
    }
}
