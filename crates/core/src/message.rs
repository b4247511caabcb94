//! Messages flowing through the handler.

use compact_str::CompactString;

/// A message received from a chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Conversation the reply is routed back to.
    pub conversation: CompactString,
    /// Message text. May be empty.
    pub content: String,
}

impl InboundMessage {
    /// Create a new inbound message.
    pub fn new(conversation: impl Into<CompactString>, content: impl Into<String>) -> Self {
        Self {
            conversation: conversation.into(),
            content: content.into(),
        }
    }
}

/// Outcome of a handled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// The reply carries the agent's final output.
    Answered,
    /// The run failed and the reply describes the failure.
    Failed,
}

/// A reply sent back to the originating conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Conversation this reply belongs to.
    pub conversation: CompactString,
    /// Reply text.
    pub content: String,
    /// Whether the run succeeded.
    pub status: ReplyStatus,
}

impl OutboundMessage {
    /// A reply carrying the agent's output.
    pub fn answer(conversation: impl Into<CompactString>, content: impl Into<String>) -> Self {
        Self {
            conversation: conversation.into(),
            content: content.into(),
            status: ReplyStatus::Answered,
        }
    }

    /// A reply describing a failed run.
    pub fn failure(conversation: impl Into<CompactString>, content: impl Into<String>) -> Self {
        Self {
            conversation: conversation.into(),
            content: content.into(),
            status: ReplyStatus::Failed,
        }
    }

    /// Whether the run behind this reply failed.
    pub fn is_failure(&self) -> bool {
        self.status == ReplyStatus::Failed
    }
}

/// The result of one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// The run's terminal text output.
    pub final_output: String,
}

impl RunResult {
    /// Create a run result.
    pub fn new(final_output: impl Into<String>) -> Self {
        Self {
            final_output: final_output.into(),
        }
    }
}
