//! OpenAI-compatible chat completions request body.

use ccore::{Agent, ModelBinding};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A message in the request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    /// The role of the message
    pub role: Role,

    /// The content of the message
    pub content: String,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system role
    System,
    /// The user role
    User,
    /// The assistant role
    Assistant,
    /// The tool role
    Tool,
}

/// Chat completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: CompactString,
    /// The messages to send.
    pub messages: Vec<Message>,
}

impl Request {
    /// Create an empty request for the given model.
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Build the request for one run: the agent's instructions as the
    /// system prompt, then the input as the only user turn.
    pub fn for_run(agent: &Agent, input: &str, model: &ModelBinding) -> Self {
        let mut request = Self::new(model.model_name.clone());
        if !agent.instructions.is_empty() {
            request = request.message(Message::system(&agent.instructions));
        }
        request.message(Message::user(input))
    }
}
