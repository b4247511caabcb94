//! Tests for the message handler.

use courier_core::{
    Agent, AgentExecutionError, GEMINI_BASE_URL, Handler, InboundMessage, OutboundMessage,
    ProviderConfig, ReplyStatus, RunConfig, RunResult, Runner, bind_model, build_run_config,
    define_agent, handle_message,
};
use futures_util::future::join_all;
use std::{collections::BTreeMap, sync::Arc, time::Duration};

fn run_config() -> RunConfig {
    let provider = Arc::new(ProviderConfig::new("test-key", GEMINI_BASE_URL).unwrap());
    let model = bind_model("gemini-1.5-flash", Arc::clone(&provider)).unwrap();
    build_run_config(model, provider, true)
}

fn agent() -> Agent {
    define_agent("Assistant", "You are a helpful assistant")
}

/// Returns the same declared output whatever the input.
struct FixedRunner(&'static str);

impl Runner for FixedRunner {
    async fn run(&self, _: &Agent, _: &str, _: &RunConfig) -> Result<RunResult, AgentExecutionError> {
        Ok(RunResult::new(self.0))
    }
}

/// Maps known inputs to outputs.
struct ScriptedRunner(BTreeMap<&'static str, &'static str>);

impl Runner for ScriptedRunner {
    async fn run(
        &self,
        _: &Agent,
        input: &str,
        _: &RunConfig,
    ) -> Result<RunResult, AgentExecutionError> {
        self.0
            .get(input)
            .map(|out| RunResult::new(*out))
            .ok_or_else(|| AgentExecutionError::MalformedResponse(format!("no script for {input}")))
    }
}

/// Always fails.
struct FailingRunner;

impl Runner for FailingRunner {
    async fn run(&self, _: &Agent, _: &str, _: &RunConfig) -> Result<RunResult, AgentExecutionError> {
        Err(AgentExecutionError::RateLimited("quota exceeded".into()))
    }
}

/// Sleeps, then answers with a transformation of the input.
struct SlowRunner(Duration);

impl Runner for SlowRunner {
    async fn run(
        &self,
        agent: &Agent,
        input: &str,
        _: &RunConfig,
    ) -> Result<RunResult, AgentExecutionError> {
        tokio::time::sleep(self.0).await;
        Ok(RunResult::new(format!("{}: {}", agent.name, input.to_uppercase())))
    }
}

/// Records what the handler forwarded.
struct InspectingRunner;

impl Runner for InspectingRunner {
    async fn run(
        &self,
        agent: &Agent,
        input: &str,
        config: &RunConfig,
    ) -> Result<RunResult, AgentExecutionError> {
        Ok(RunResult::new(format!(
            "{}|{}|{}|{}",
            agent.instructions, input, config.model.model_name, config.tracing_disabled
        )))
    }
}

#[tokio::test]
async fn hello_yields_scripted_reply() {
    let runner = ScriptedRunner(BTreeMap::from([("Hello", "Hi there!")]));
    let reply = handle_message(
        &runner,
        InboundMessage::new("chat-1", "Hello"),
        &agent(),
        &run_config(),
    )
    .await;
    assert_eq!(reply, OutboundMessage::answer("chat-1", "Hi there!"));
}

#[tokio::test]
async fn reply_is_final_output_not_input() {
    let runner = FixedRunner("declared output");
    for input in ["", "Hello", "  spaces  ", "multi\nline", "ünïcödé"] {
        let reply = handle_message(
            &runner,
            InboundMessage::new("c", input),
            &agent(),
            &run_config(),
        )
        .await;
        assert_eq!(reply.content, "declared output");
        assert_eq!(reply.status, ReplyStatus::Answered);
    }
}

#[tokio::test]
async fn forwards_agent_input_and_config_unchanged() {
    let reply = handle_message(
        &InspectingRunner,
        InboundMessage::new("c", "what time is it?"),
        &agent(),
        &run_config(),
    )
    .await;
    assert_eq!(
        reply.content,
        "You are a helpful assistant|what time is it?|gemini-1.5-flash|true"
    );
}

#[tokio::test]
async fn failed_run_yields_failure_reply() {
    let reply = handle_message(
        &FailingRunner,
        InboundMessage::new("chat-9", "Hello"),
        &agent(),
        &run_config(),
    )
    .await;
    assert!(reply.is_failure());
    assert_eq!(reply.conversation, "chat-9");
    assert!(reply.content.contains("quota exceeded"));
}

#[tokio::test]
async fn handler_run_surfaces_typed_error() {
    let handler = Handler::new(FailingRunner, agent(), run_config());
    let err = handler
        .run(&InboundMessage::new("c", "Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentExecutionError::RateLimited(_)));
}

#[tokio::test]
async fn handler_times_out_slow_runs() {
    let handler = Handler::new(SlowRunner(Duration::from_secs(5)), agent(), run_config())
        .with_timeout(Duration::from_millis(20));

    let err = handler
        .run(&InboundMessage::new("c", "Hello"))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let reply = handler.handle(InboundMessage::new("c", "Hello")).await;
    assert!(reply.is_failure());
    assert!(reply.content.contains("timed out"));
}

#[tokio::test]
async fn handler_within_timeout_answers() {
    let handler = Handler::new(SlowRunner(Duration::from_millis(1)), agent(), run_config())
        .with_timeout(Duration::from_secs(5));
    let reply = handler.handle(InboundMessage::new("c", "hi")).await;
    assert_eq!(reply.content, "Assistant: HI");
    assert_eq!(handler.timeout(), Some(Duration::from_secs(5)));
}

#[tokio::test]
async fn concurrent_messages_do_not_cross_talk() {
    let handler = Handler::new(SlowRunner(Duration::from_millis(50)), agent(), run_config());
    let inputs: Vec<String> = (0..32).map(|i| format!("message {i}")).collect();

    let started = std::time::Instant::now();
    let replies = join_all(inputs.iter().enumerate().map(|(i, input)| {
        let handler = handler.clone();
        let msg = InboundMessage::new(format!("conv-{i}"), input.clone());
        async move { handler.handle(msg).await }
    }))
    .await;

    // 32 sequential runs would take at least 1.6s.
    assert!(started.elapsed() < Duration::from_millis(1000));
    for (i, reply) in replies.iter().enumerate() {
        assert_eq!(reply.conversation, format!("conv-{i}"));
        assert_eq!(reply.content, format!("Assistant: MESSAGE {i}"));
    }
}

#[tokio::test]
async fn concurrent_spawned_tasks_do_not_cross_talk() {
    let handler = Handler::new(SlowRunner(Duration::from_millis(20)), agent(), run_config());
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let handler = handler.clone();
        tasks.spawn(async move {
            let reply = handler
                .handle(InboundMessage::new(format!("conv-{i}"), format!("q{i}")))
                .await;
            (i, reply)
        });
    }

    let mut seen = 0;
    while let Some(done) = tasks.join_next().await {
        let (i, reply) = done.unwrap();
        assert_eq!(reply.conversation, format!("conv-{i}"));
        assert_eq!(reply.content, format!("Assistant: Q{i}"));
        seen += 1;
    }
    assert_eq!(seen, 16);
}
