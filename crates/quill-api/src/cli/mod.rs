//! CLI command definitions for the `quill` binary.

pub mod render;
pub mod run;
pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Draft and refine posts with a human in the loop.
#[derive(Parser)]
#[command(name = "quill", version, about, long_about = None)]
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

    /// Config file (default: ~/.quill/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Export spans through the OpenTelemetry stdout exporter.
    #[arg(long, global = true, env = "QUILL_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a post and refine it until you answer "done".
    Run {
        /// What the post is about.
        #[arg(long, short)]
        topic: String,

        /// Conversation thread identity (default from config).
        #[arg(long)]
        thread_id: Option<String>,

        /// Pre-supplied feedback, consumed in order instead of prompting.
        /// Repeat the flag for each round; end with "done".
        #[arg(long = "feedback", short = 'f', value_name = "TEXT")]
        feedback: Vec<String>,
    },

    /// Interactive session with start/resume/show/list commands.
    Shell,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
