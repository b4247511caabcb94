//! Gateway wire protocol.
//!
//! JSON text frames tagged by `type`. A client may attach an `id` to each
//! `send`; the matching `response` or `error` carries it back as
//! `reply_to`, so replies that complete out of order can be matched up.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Messages sent by the client to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Forward a message to the agent.
    Send {
        /// Message content.
        content: String,
        /// Client-chosen correlation id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<CompactString>,
    },
    /// Ping the server (keepalive).
    Ping,
}

/// Messages sent by the gateway to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection.
    Connected {
        /// Conversation id assigned to this connection.
        conversation: CompactString,
    },
    /// The agent's final output.
    Response {
        /// Response content.
        content: String,
        /// The `id` of the `send` this answers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to: Option<CompactString>,
    },
    /// A request could not be served.
    Error {
        /// HTTP-style status code.
        code: u16,
        /// Error message.
        message: String,
        /// The `id` of the `send` this answers, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to: Option<CompactString>,
    },
    /// Pong response to a client ping.
    Pong,
}
