//! WebSocket chat gateway.
//!
//! Each connection is one conversation. Every `send` frame runs in its own
//! task, so a slow run never holds up the rest of the socket.

use crate::protocol::{ClientMessage, ServerMessage};
use anyhow::Result;
use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use ccore::{Handler, InboundMessage, Runner};
use compact_str::CompactString;
use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinSet,
};
use ulid::Ulid;

/// Build the axum router with the `/ws` and `/health` endpoints.
pub fn router<R: Runner + 'static>(handler: Handler<R>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler::<R>))
        .route("/health", get(|| async { "ok" }))
        .with_state(handler)
}

/// Run the agent on one `send` frame and build the frame to answer with.
///
/// A failed run answers with code 502, or 504 when it timed out.
pub async fn respond<R: Runner>(
    handler: &Handler<R>,
    msg: InboundMessage,
    id: Option<CompactString>,
) -> ServerMessage {
    match handler.run(&msg).await {
        Ok(reply) => ServerMessage::Response {
            content: reply.content,
            reply_to: id,
        },
        Err(e) => ServerMessage::Error {
            code: if e.is_timeout() { 504 } else { 502 },
            message: format!("agent error: {e}"),
            reply_to: id,
        },
    }
}

/// Handle returned by [`serve`], holding the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the gateway is listening on.
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Bind the gateway on `bind` and start serving in a spawned task.
///
/// Call [`ServeHandle::shutdown`] to stop it.
pub async fn serve<R: Runner + 'static>(handler: Handler<R>, bind: &str) -> Result<ServeHandle> {
    let app = router(handler);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("gateway listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("gateway shutting down");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}

async fn ws_handler<R: Runner + 'static>(
    State(handler): State<Handler<R>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, handler))
}

async fn handle_socket<R: Runner + 'static>(socket: WebSocket, handler: Handler<R>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("failed to serialize server message: {e}");
                    continue;
                }
            };
            if sender.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let conversation = CompactString::from(Ulid::new().to_string());
    tracing::debug!(%conversation, "connection opened");
    let _ = tx.send(ServerMessage::Connected {
        conversation: conversation.clone(),
    });

    let mut runs = JoinSet::new();
    while let Some(Ok(ws_msg)) = receiver.next().await {
        let text = match ws_msg {
            WsMessage::Text(t) => t,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Send { content, id }) => {
                let handler = handler.clone();
                let tx = tx.clone();
                let msg = InboundMessage::new(conversation.clone(), content);
                runs.spawn(async move {
                    let _ = tx.send(respond(&handler, msg, id).await);
                });
            }
            Ok(ClientMessage::Ping) => {
                let _ = tx.send(ServerMessage::Pong);
            }
            Err(e) => {
                let _ = tx.send(ServerMessage::Error {
                    code: 400,
                    message: format!("invalid message: {e}"),
                    reply_to: None,
                });
            }
        }

        while let Some(done) = runs.try_join_next() {
            if let Err(e) = done {
                tracing::error!(%conversation, "run task aborted: {e}");
            }
        }
    }

    // The peer is gone; nobody is left to read pending replies.
    runs.abort_all();
    drop(tx);
    let _ = send_task.await;
    tracing::debug!(%conversation, "connection closed");
}
