//! CLI command definitions for the `shopchat` binary.

pub mod chat;
pub mod history;
pub mod send;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Talk to the storefront AI assistant and serve chat instances over REST.
#[derive(Parser)]
#[command(name = "shopchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SHOPCHAT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identity options shared by `chat` and `send`.
#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Chat session id passed to the completion service (new id if omitted).
    #[arg(long, short)]
    pub session: Option<String>,

    /// Chat as a signed-in member: replies are persisted to the backend.
    #[arg(long)]
    pub member: bool,

    /// Backend conversation id that member replies belong to.
    #[arg(long, short)]
    pub conversation: Option<i64>,
}

impl ChatArgs {
    /// The session id to use, generating one when none was given.
    pub fn session_id(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(|| uuid::Uuid::now_v7().to_string())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat with the assistant.
    Chat {
        #[command(flatten)]
        args: ChatArgs,

        /// Load past exchanges before the first prompt.
        #[arg(long)]
        history: bool,
    },

    /// Send a single message and print the reply.
    Send {
        /// Message text.
        message: String,

        #[command(flatten)]
        args: ChatArgs,
    },

    /// List past exchanges recorded by the completion provider.
    History {
        /// Show at most this many exchanges (most recent last).
        #[arg(long, short, default_value = "20")]
        limit: usize,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
