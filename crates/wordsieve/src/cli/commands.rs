//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Options shared by the text-processing commands.
#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Text to process (reads stdin when omitted)
    pub text: Option<String>,

    /// Filler characters tolerated inside one match (overrides config)
    #[arg(short, long)]
    pub gap: Option<usize>,
}

/// Redact command arguments.
#[derive(Debug, Args)]
pub struct RedactCommand {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub input: MatchArgs,

    /// Replacement character (overrides config)
    #[arg(short, long)]
    pub replacement: Option<char>,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub input: MatchArgs,
}

/// Filter command arguments.
#[derive(Debug, Args)]
pub struct FilterCommand {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub input: MatchArgs,

    /// What to do with matching text (overrides config)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Spans command arguments.
#[derive(Debug, Args)]
pub struct SpansCommand {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub input: MatchArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Dictionary commands.
#[derive(Debug, Subcommand)]
pub enum DictCommand {
    /// Show dictionary statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the built trie in its nested JSON form
    Export {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Trie cache commands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show cache statistics
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove every cached trie
    Clear,

    /// Remove expired cached tries
    Prune,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Filter mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Replace matched characters
    Redact,
    /// Reject matching text
    Block,
    /// Log matches, pass text through
    WarnOnly,
}

impl From<ModeArg> for crate::filter::FilterMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Redact => Self::Redact,
            ModeArg::Block => Self::Block,
            ModeArg::WarnOnly => Self::WarnOnly,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
