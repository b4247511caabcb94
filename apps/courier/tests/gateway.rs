//! Tests for the WebSocket gateway.

use ccore::{
    Agent, AgentExecutionError, GEMINI_BASE_URL, Handler, InboundMessage, ProviderConfig,
    RunConfig, RunResult, Runner, bind_model, build_run_config, define_agent,
};
use courier::{ServerMessage, gateway};
use futures_util::{SinkExt, StreamExt};
use model::Client;
use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use ulid::Ulid;

fn run_config() -> RunConfig {
    let provider = Arc::new(ProviderConfig::new("test-key", GEMINI_BASE_URL).unwrap());
    let model = bind_model("gemini-1.5-flash", Arc::clone(&provider)).unwrap();
    build_run_config(model, provider, true)
}

/// Answers with the input reversed; `fail` is rejected, `wait` and `slow`
/// sleep first.
struct StubRunner;

impl Runner for StubRunner {
    async fn run(
        &self,
        _: &Agent,
        input: &str,
        _: &RunConfig,
    ) -> Result<RunResult, AgentExecutionError> {
        match input {
            "fail" => Err(AgentExecutionError::Auth("API key not valid".into())),
            "wait" => {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(RunResult::new("tiaw"))
            }
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(RunResult::new("too late"))
            }
            _ => Ok(RunResult::new(input.chars().rev().collect::<String>())),
        }
    }
}

fn handler() -> Handler<StubRunner> {
    Handler::new(
        StubRunner,
        define_agent("Assistant", "You are a helpful assistant"),
        run_config(),
    )
    .with_timeout(Duration::from_millis(100))
}

#[tokio::test]
async fn respond_answers_with_final_output() {
    let reply = gateway::respond(
        &handler(),
        InboundMessage::new("conv", "olleH"),
        Some("req-1".into()),
    )
    .await;
    assert_eq!(
        reply,
        ServerMessage::Response {
            content: "Hello".into(),
            reply_to: Some("req-1".into()),
        }
    );
}

#[tokio::test]
async fn respond_reports_failed_run() {
    let reply = gateway::respond(&handler(), InboundMessage::new("conv", "fail"), None).await;
    match reply {
        ServerMessage::Error {
            code,
            message,
            reply_to,
        } => {
            assert_eq!(code, 502);
            assert!(message.contains("API key not valid"));
            assert_eq!(reply_to, None);
        }
        other => panic!("expected error frame, got {other:?}"),
    }
}

#[tokio::test]
async fn respond_reports_timeout() {
    let reply = gateway::respond(
        &handler(),
        InboundMessage::new("conv", "slow"),
        Some("req-2".into()),
    )
    .await;
    match reply {
        ServerMessage::Error { code, reply_to, .. } => {
            assert_eq!(code, 504);
            assert_eq!(reply_to.as_deref(), Some("req-2"));
        }
        other => panic!("expected error frame, got {other:?}"),
    }
}

/// Log sink shared with the fmt subscriber.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn failed_run_is_logged_once() {
    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let handler = handler();
    gateway::respond(&handler, InboundMessage::new("conv-ws", "fail"), None).await;
    handler.handle(InboundMessage::new("conv-cli", "fail")).await;

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("agent run failed").count(), 2);
    assert_eq!(output.matches("conv-ws").count(), 1);
    assert_eq!(output.matches("conv-cli").count(), 1);
}

#[tokio::test]
async fn concurrent_responds_keep_their_ids() {
    let handler = handler();
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let handler = handler.clone();
        tasks.spawn(async move {
            let input = format!("message-{i}");
            let msg = InboundMessage::new("conv", input.clone());
            let reply = gateway::respond(&handler, msg, Some(i.to_string().into())).await;
            (i, input, reply)
        });
    }

    while let Some(done) = tasks.join_next().await {
        let (i, input, reply) = done.unwrap();
        assert_eq!(
            reply,
            ServerMessage::Response {
                content: input.chars().rev().collect(),
                reply_to: Some(i.to_string().into()),
            }
        );
    }
}

#[tokio::test]
async fn serve_health_and_shutdown() {
    let handle = gateway::serve(handler(), "127.0.0.1:0").await.unwrap();
    let url = format!("http://127.0.0.1:{}/health", handle.port);

    let resp = Client::new().get(&url).send().await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "ok");

    handle.shutdown().await.unwrap();
    assert!(Client::new().get(&url).send().await.is_err());
}

#[tokio::test]
async fn ws_route_requires_upgrade() {
    let handle = gateway::serve(handler(), "127.0.0.1:0").await.unwrap();
    let url = format!("http://127.0.0.1:{}/ws", handle.port);

    let resp = Client::new().get(&url).send().await.unwrap();
    assert!(resp.status().is_client_error());

    handle.shutdown().await.unwrap();
}

/// Read the next text frame as a server message.
async fn next_frame(socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("frame in time")
            .expect("socket open")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn ws_round_trip_answers_out_of_order() {
    let handler = Handler::new(
        StubRunner,
        define_agent("Assistant", "You are a helpful assistant"),
        run_config(),
    )
    .with_timeout(Duration::from_secs(2));
    let handle = gateway::serve(handler, "127.0.0.1:0").await.unwrap();
    let url = format!("ws://127.0.0.1:{}/ws", handle.port);
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

    match next_frame(&mut socket).await {
        ServerMessage::Connected { conversation } => {
            assert!(Ulid::from_string(&conversation).is_ok());
        }
        other => panic!("expected connected frame, got {other:?}"),
    }

    for frame in [
        r#"{"type":"send","content":"wait","id":"1"}"#,
        r#"{"type":"send","content":"olleH","id":"2"}"#,
        r#"{"type":"send","content":"fail","id":"3"}"#,
        r#"{"type":"ping"}"#,
        "garbage",
    ] {
        socket.send(Message::text(frame)).await.unwrap();
    }

    let mut frames = Vec::new();
    while frames.len() < 5 {
        frames.push(next_frame(&mut socket).await);
    }

    assert!(frames.contains(&ServerMessage::Pong));
    assert!(frames.iter().any(|f| matches!(
        f,
        ServerMessage::Error { code: 400, reply_to: None, .. }
    )));
    assert!(frames.iter().any(|f| matches!(
        f,
        ServerMessage::Error { code: 502, reply_to: Some(id), .. } if id == "3"
    )));

    let position = |id: &str, content: &str| {
        frames
            .iter()
            .position(|f| {
                *f == ServerMessage::Response {
                    content: content.into(),
                    reply_to: Some(id.into()),
                }
            })
            .unwrap_or_else(|| panic!("no response for {id} in {frames:?}"))
    };
    assert!(position("2", "Hello") < position("1", "tiaw"));

    socket.close(None).await.unwrap();
    handle.shutdown().await.unwrap();
}
