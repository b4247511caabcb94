//! Core abstractions for the Courier message relay.
//!
//! - [`ProviderConfig`], [`ModelBinding`], [`RunConfig`]: immutable settings
//!   built once at startup.
//! - [`Agent`]: the single persona messages are forwarded to.
//! - [`Runner`]: the narrow execution capability a run goes through.
//! - [`Handler`] / [`handle_message`]: turn one inbound message into one reply.
//! - [`Channel`] / [`serve`]: connect the handler to a chat transport.

pub use {
    agent::{Agent, DEFAULT_AGENT_NAME, DEFAULT_INSTRUCTIONS, define_agent},
    channel::{Channel, serve},
    config::{
        API_KEY_ENV, DEFAULT_MODEL, GEMINI_BASE_URL, ModelBinding, ProviderConfig, RunConfig,
        bind_model, build_run_config, load_provider_config,
    },
    error::{AgentExecutionError, BoxError, ConfigError},
    handler::{Handler, handle_message},
    message::{InboundMessage, OutboundMessage, ReplyStatus, RunResult},
    runner::Runner,
};

mod agent;
mod channel;
mod config;
mod error;
mod handler;
mod message;
mod runner;
