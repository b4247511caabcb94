//! Channel trait and dispatch loop for chat transports.
//!
//! A channel yields inbound messages and accepts replies. [`serve`] drives
//! one channel: every inbound message is handled in its own task and
//! answered through the same channel.

use crate::{Handler, InboundMessage, OutboundMessage, Runner};
use anyhow::Result;
use futures_core::Stream;
use futures_util::StreamExt;
use std::{future::Future, pin::pin, sync::Arc};
use tokio::task::JoinSet;

/// A connection to a chat transport.
///
/// Methods use RPITIT for async without boxing.
pub trait Channel: Send + Sync {
    /// Open the transport and return the stream of inbound messages.
    fn connect(
        &self,
    ) -> impl Future<Output = Result<impl Stream<Item = InboundMessage> + Send>> + Send;

    /// Deliver a reply to its conversation.
    fn send(&self, message: OutboundMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Serve `channel` until its inbound stream ends.
///
/// Each message gets exactly one reply. Replies are sent as soon as their
/// run completes, so they may go out in a different order than the
/// messages came in. Returns once every in-flight reply has been sent.
pub async fn serve<C, R>(channel: Arc<C>, handler: Handler<R>) -> Result<()>
where
    C: Channel + 'static,
    R: Runner + 'static,
{
    let mut tasks = JoinSet::new();
    {
        let mut events = pin!(channel.connect().await?);
        while let Some(msg) = events.next().await {
            let channel = Arc::clone(&channel);
            let handler = handler.clone();
            tasks.spawn(async move {
                let conversation = msg.conversation.clone();
                let reply = handler.handle(msg).await;
                if let Err(e) = channel.send(reply).await {
                    tracing::error!(%conversation, "failed to send reply: {e}");
                }
            });

            while let Some(done) = tasks.try_join_next() {
                if let Err(e) = done {
                    tracing::error!("message task aborted: {e}");
                }
            }
        }
    }

    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            tracing::error!("message task aborted: {e}");
        }
    }
    Ok(())
}
