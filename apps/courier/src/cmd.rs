//! CLI argument parsing and command dispatch.

use crate::{CourierConfig, StdioChannel, build_handler, gateway};
use anyhow::{Context, Result};
use ccore::{Handler, InboundMessage};
use clap::{Parser, Subcommand};
use compact_str::CompactString;
use model::{Client, OpenAIRunner};
use std::{path::PathBuf, sync::Arc};

/// Conversation id used by one-shot `send`.
const SEND_CONVERSATION: &str = "cli";

/// Relay chat messages to an LLM agent.
#[derive(Parser, Debug)]
#[command(name = "courier", about = "Relay chat messages to an LLM agent")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the TOML config file. Defaults to ./courier.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model name override.
    #[arg(long, global = true)]
    pub model: Option<CompactString>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket chat gateway.
    Serve {
        /// Address to listen on, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Chat interactively over stdin and stdout.
    Chat,
    /// Send a one-shot message and print the reply.
    Send {
        /// Message content.
        content: String,
    },
}

impl Cli {
    /// Load configuration, build the handler and run the command.
    pub async fn run(self) -> Result<()> {
        let mut config = CourierConfig::resolve(self.config.as_deref())?;
        if let Some(model) = self.model {
            config.model.name = model;
        }

        let handler = build_handler(&config, |key| std::env::var(key).ok(), Client::new())
            .context("invalid configuration")?;
        let run = handler.config();
        tracing::info!(
            model = %run.model.model_name,
            endpoint = %run.model.provider.endpoint(),
            agent = %handler.agent().name,
            "courier ready"
        );

        match self.command {
            Command::Serve { bind } => {
                let bind = bind.unwrap_or(config.server.bind);
                serve(handler, &bind).await
            }
            Command::Chat => chat(handler).await,
            Command::Send { content } => send(handler, content).await,
        }
    }
}

async fn serve(handler: Handler<OpenAIRunner>, bind: &str) -> Result<()> {
    let handle = gateway::serve(handler, bind).await?;
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("received shutdown signal");
    handle.shutdown().await
}

async fn chat(handler: Handler<OpenAIRunner>) -> Result<()> {
    println!("Courier chat (Ctrl+D to exit)");
    ccore::serve(Arc::new(StdioChannel::new()), handler).await
}

async fn send(handler: Handler<OpenAIRunner>, content: String) -> Result<()> {
    let reply = handler
        .handle(InboundMessage::new(SEND_CONVERSATION, content))
        .await;
    if reply.is_failure() {
        anyhow::bail!("{}", reply.content);
    }
    println!("{}", reply.content);
    Ok(())
}
