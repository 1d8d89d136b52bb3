//! CLI interface for Sage
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sage research assistant
///
/// Answers questions with an LLM agent that searches the web, Wikipedia and
/// arXiv. Run `sage serve` for the chat UI or `sage chat` in the terminal.
#[derive(Parser, Debug)]
#[command(name = "sage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Model and temperature overrides shared by `chat` and `ask`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Model id or display name (see `sage models`)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature between 0.0 and 1.0
    #[arg(short, long)]
    pub temperature: Option<f32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the chat UI
    Serve {
        /// Address to bind, overriding `[server] bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Chat in the terminal
    Chat {
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List the models on offer
    Models,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}
