//! Agent definition.
//!
//! An [`Agent`] is pure config: a name and the instructions sent as the
//! system prompt of every run. How a run executes is up to the
//! [`Runner`](crate::Runner).

use compact_str::CompactString;

/// Default agent name.
pub const DEFAULT_AGENT_NAME: &str = "Assistant";

/// Default agent instructions.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant";

/// An agent definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Agent identifier, used in logs.
    pub name: CompactString,
    /// Instructions sent before each user input. Opaque to Courier.
    pub instructions: String,
}

impl Agent {
    /// Create a new agent with the given name and no instructions.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
        }
    }

    /// Set the instructions.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

impl Default for Agent {
    fn default() -> Self {
        define_agent(DEFAULT_AGENT_NAME, DEFAULT_INSTRUCTIONS)
    }
}

/// Define an agent from a name and a static instruction string.
pub fn define_agent(name: impl Into<CompactString>, instructions: impl Into<String>) -> Agent {
    Agent::new(name).instructions(instructions)
}
