//! Command-line interface definition for Feedloop
//!
//! This module defines the CLI structure using clap's derive API,
//! providing an interactive chat command and a non-interactive review command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Feedloop - project feedback chat with an LLM mentor
///
/// Describe a project through a short form, receive structured feedback,
/// ask follow-up questions, and export the conversation as a PDF report.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "feedloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the model from config
    #[arg(long)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Feedloop
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fill in the project form interactively and chat about the feedback
    Chat,

    /// Submit a form file, send follow-up messages, and optionally export
    Review {
        /// Project form (YAML)
        #[arg(short, long)]
        form: PathBuf,

        /// Follow-up message, repeat for several exchanges
        #[arg(short, long = "message")]
        messages: Vec<String>,

        /// Write the PDF report here once export is available
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Chat
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
