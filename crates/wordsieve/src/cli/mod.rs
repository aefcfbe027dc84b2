//! Command-line interface for wordsieve.
//!
//! This module provides the CLI structure for the `wsieve` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CacheCommand, CheckCommand, ConfigCommand, DictCommand, FilterCommand, MatchArgs, ModeArg,
    OutputFormat, RedactCommand, SpansCommand,
};

/// wsieve - Detect and redact dictionary phrases
///
/// Matches a phrase dictionary against text, tolerating filler characters
/// inserted between the letters of a phrase.
#[derive(Debug, Parser)]
#[command(name = "wsieve")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the dictionary file (overrides config)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub dict: Option<PathBuf>,

    /// Build the dictionary without reading or writing the trie cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace dictionary phrases in text
    Redact(RedactCommand),

    /// Apply the configured filter mode to text
    Filter(FilterCommand),

    /// Exit with status 1 if text contains a dictionary phrase
    Check(CheckCommand),

    /// List the character spans of every match
    Spans(SpansCommand),

    /// Inspect the dictionary
    #[command(subcommand)]
    Dict(DictCommand),

    /// Manage the trie cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "wsieve");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(
            parse(&["wsieve", "-q", "check"]).verbosity(),
            crate::logging::Verbosity::Quiet
        );
        assert_eq!(
            parse(&["wsieve", "check"]).verbosity(),
            crate::logging::Verbosity::Normal
        );
        assert_eq!(
            parse(&["wsieve", "-v", "check"]).verbosity(),
            crate::logging::Verbosity::Verbose
        );
        assert_eq!(
            parse(&["wsieve", "-vv", "check"]).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_redact() {
        let cli = parse(&["wsieve", "redact", "some text", "-g", "2", "-r", "#"]);
        let Command::Redact(cmd) = cli.command else {
            panic!("expected redact command");
        };
        assert_eq!(cmd.input.text.as_deref(), Some("some text"));
        assert_eq!(cmd.input.gap, Some(2));
        assert_eq!(cmd.replacement, Some('#'));
    }

    #[test]
    fn test_parse_redact_from_stdin() {
        let cli = parse(&["wsieve", "redact"]);
        let Command::Redact(cmd) = cli.command else {
            panic!("expected redact command");
        };
        assert!(cmd.input.text.is_none());
        assert!(cmd.input.gap.is_none());
    }

    #[test]
    fn test_parse_filter_mode() {
        let cli = parse(&["wsieve", "filter", "--mode", "warn-only", "text"]);
        let Command::Filter(cmd) = cli.command else {
            panic!("expected filter command");
        };
        assert_eq!(cmd.mode, Some(ModeArg::WarnOnly));
        assert_eq!(cmd.input.text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_spans_json() {
        let cli = parse(&["wsieve", "spans", "x", "--format", "json"]);
        let Command::Spans(cmd) = cli.command else {
            panic!("expected spans command");
        };
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_dict_and_cache() {
        assert!(matches!(
            parse(&["wsieve", "dict", "stats"]).command,
            Command::Dict(DictCommand::Stats { json: false })
        ));
        assert!(matches!(
            parse(&["wsieve", "cache", "clear"]).command,
            Command::Cache(CacheCommand::Clear)
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = parse(&[
            "wsieve",
            "-c",
            "/custom/config.toml",
            "--dict",
            "/custom/dict.txt",
            "--no-cache",
            "check",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.dict, Some(PathBuf::from("/custom/dict.txt")));
        assert!(cli.no_cache);
    }

    #[test]
    fn test_rejects_multi_char_replacement() {
        let result = Cli::try_parse_from(["wsieve", "redact", "x", "-r", "ab"]);
        assert!(result.is_err());
    }
}
