//! Terminal chat channel.

use anyhow::Result;
use ccore::{Channel, InboundMessage, OutboundMessage};
use compact_str::CompactString;
use futures_core::Stream;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Conversation id used for every stdin message.
pub const STDIN_CONVERSATION: &str = "stdin";

/// A channel reading one message per stdin line.
///
/// Blank lines are skipped. Answers go to stdout, failures to stderr.
pub struct StdioChannel {
    conversation: CompactString,
}

impl StdioChannel {
    /// Create a channel for the default stdin conversation.
    pub fn new() -> Self {
        Self {
            conversation: STDIN_CONVERSATION.into(),
        }
    }
}

impl Default for StdioChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for StdioChannel {
    fn connect(
        &self,
    ) -> impl Future<Output = Result<impl Stream<Item = InboundMessage> + Send>> + Send {
        let conversation = self.conversation.clone();
        async move { Ok(lines(BufReader::new(tokio::io::stdin()), conversation)) }
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        write_reply(&mut tokio::io::stdout(), &mut tokio::io::stderr(), &message).await
    }
}

/// Read `reader` line by line, yielding each non-blank line as a message
/// in `conversation`. Ends at EOF or on the first read error.
pub fn lines<R>(
    reader: R,
    conversation: CompactString,
) -> impl Stream<Item = InboundMessage> + Send
where
    R: AsyncBufRead + Unpin + Send,
{
    async_stream::stream! {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    yield InboundMessage::new(conversation.clone(), line);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("failed to read input: {e}");
                    break;
                }
            }
        }
    }
}

/// Write a reply as one line: answers to `out`, failures to `err`.
pub async fn write_reply<O, E>(out: &mut O, err: &mut E, message: &OutboundMessage) -> Result<()>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let line = format!("{}\n", message.content);
    if message.is_failure() {
        err.write_all(line.as_bytes()).await?;
        err.flush().await?;
    } else {
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}
