//! CLI command definitions for the `aula` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `aula topic add`, `aula user show`).

pub mod chat;
pub mod stats;
pub mod topic;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Classroom chatbot with a per-student conversation cache.
#[derive(Parser)]
#[command(name = "aula", version, about, long_about = None)]
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

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to the configured port).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host address to bind to (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one message and print the reply.
    Chat {
        /// Student identifier.
        user: String,

        /// Topic the conversation belongs to.
        topic: String,

        /// Message text.
        message: String,
    },

    /// Show stored chat turns.
    History {
        /// Only show turns for this student.
        #[arg(long, short)]
        user: Option<String>,

        /// Maximum number of turns.
        #[arg(long, short, default_value = "20")]
        limit: usize,
    },

    /// Show store totals and cache occupancy.
    Stats,

    /// Manage topics.
    Topic {
        #[command(subcommand)]
        action: TopicAction,
    },

    /// Manage students.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TopicAction {
    /// Register a topic.
    Add {
        /// Unique topic name.
        name: String,

        /// Subject area.
        #[arg(long, short)]
        subject: String,

        /// Instructions seeded into new conversations.
        #[arg(long, short)]
        instructions: String,

        /// Reference material appended to the instructions.
        #[arg(long, short, default_value = "")]
        content: String,
    },

    /// List registered topics.
    #[command(alias = "ls")]
    List,

    /// Show one topic.
    Show {
        /// Topic name.
        name: String,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a student (re-registering keeps history).
    Register {
        /// Student identifier.
        user_id: String,

        /// Classroom the student belongs to.
        #[arg(long, short)]
        classroom: Option<String>,
    },

    /// Show a student's profile.
    Show {
        /// Student identifier.
        user_id: String,
    },
}

/// Truncate `text` to `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
