//! Courier application: configuration, chat gateway and terminal channel.
//!
//! The binary wires these together behind the CLI in [`cmd`].

pub use {
    builder::build_handler,
    config::{CONFIG_FILE, CourierConfig},
    protocol::{ClientMessage, ServerMessage},
    stdio::StdioChannel,
};

mod builder;
pub mod cmd;
pub mod config;
pub mod gateway;
pub mod protocol;
pub mod stdio;
mod utils;
