//! `wsieve` - CLI for wordsieve
//!
//! Loads the configured dictionary (through the trie cache when enabled) and
//! redacts, filters or checks text given as an argument or on stdin.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use wordsieve::cli::{
    CacheCommand, CheckCommand, Cli, Command, ConfigCommand, DictCommand, FilterCommand,
    MatchArgs, OutputFormat, RedactCommand, SpansCommand,
};
use wordsieve::filter::{first_match, redact_units, FilterResult, WordFilter};
use wordsieve::segment::join;
use wordsieve::{
    find_matches, init_logging, load_trie, segment, segment_bytes, Config, DictionarySource,
    SqliteTrieCache, Trie, TrieCache, Unit,
};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(dict) = &cli.dict {
        config.dictionary.path = Some(dict.clone());
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }

    match cli.command {
        Command::Redact(cmd) => handle_redact(&config, &cmd),
        Command::Filter(cmd) => handle_filter(&config, &cmd),
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Spans(cmd) => handle_spans(&config, &cmd),
        Command::Dict(cmd) => handle_dict(&config, &cmd),
        Command::Cache(cmd) => handle_cache(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Load the dictionary trie, going through the cache when it is enabled.
fn load_dictionary(config: &Config) -> anyhow::Result<Trie> {
    let path = config.dictionary_path();
    let source = DictionarySource::file(&path);

    let cache = if config.cache.enabled {
        match SqliteTrieCache::from_config(&config.cache) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Trie cache unavailable, building without it");
                None
            }
        }
    } else {
        None
    };

    load_trie(
        &source,
        cache.as_ref().map(|c| c as &dyn TrieCache),
        config.dictionary.strict,
    )
    .with_context(|| format!("loading dictionary {}", path.display()))
}

/// Segment the text argument, or stdin when none was given.
fn read_input(args: &MatchArgs) -> anyhow::Result<Vec<Unit>> {
    if let Some(text) = &args.text {
        return Ok(segment(text));
    }
    let bytes = read_stdin()?;
    Ok(segment_bytes(&bytes)?)
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("reading stdin")?;
    Ok(bytes)
}

fn handle_redact(config: &Config, cmd: &RedactCommand) -> anyhow::Result<ExitCode> {
    let trie = load_dictionary(config)?;
    let units = read_input(&cmd.input)?;
    let max_gap = cmd.input.gap.unwrap_or(config.filter.max_gap);
    let replacement = cmd.replacement.unwrap_or(config.filter.replacement);

    let (redacted, _) = redact_units(&units, &trie, max_gap, replacement);
    write_stdout(&join(&redacted))?;
    Ok(ExitCode::SUCCESS)
}

fn handle_filter(config: &Config, cmd: &FilterCommand) -> anyhow::Result<ExitCode> {
    let trie = load_dictionary(config)?;
    let mut filter_config = config.filter_config();
    if let Some(gap) = cmd.input.gap {
        filter_config.max_gap = gap;
    }
    if let Some(mode) = cmd.mode {
        filter_config.mode = mode.into();
    }
    let filter = WordFilter::with_config(trie, filter_config);

    let text = match &cmd.input.text {
        Some(text) => text.clone(),
        None => join(&read_input(&cmd.input)?),
    };

    match filter.filter(&text) {
        FilterResult::Passed => {
            write_stdout(&text)?;
            Ok(ExitCode::SUCCESS)
        }
        FilterResult::Redacted { content, .. } => {
            write_stdout(&content)?;
            Ok(ExitCode::SUCCESS)
        }
        FilterResult::Blocked { span } => {
            eprintln!("blocked: dictionary phrase at {}-{}", span.start, span.end);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<ExitCode> {
    let trie = load_dictionary(config)?;
    let units = read_input(&cmd.input)?;
    let max_gap = cmd.input.gap.unwrap_or(config.filter.max_gap);

    match first_match(&units, &trie, max_gap) {
        Some(span) => {
            println!("match at {}-{}", span.start, span.end);
            Ok(ExitCode::FAILURE)
        }
        None => {
            println!("clean");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn handle_spans(config: &Config, cmd: &SpansCommand) -> anyhow::Result<ExitCode> {
    let trie = load_dictionary(config)?;
    let units = read_input(&cmd.input)?;
    let max_gap = cmd.input.gap.unwrap_or(config.filter.max_gap);

    let spans: Vec<_> = find_matches(&units, &trie, max_gap)
        .map(|span| (span, join(&units[span.start..=span.end])))
        .collect();

    match cmd.format {
        OutputFormat::Plain => {
            for (span, text) in &spans {
                println!("{}-{}\t{}", span.start, span.end, text);
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = spans
                .iter()
                .map(|(span, text)| {
                    serde_json::json!({
                        "start": span.start,
                        "end": span.end,
                        "text": text,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_dict(config: &Config, cmd: &DictCommand) -> anyhow::Result<ExitCode> {
    let trie = load_dictionary(config)?;

    match cmd {
        DictCommand::Stats { json } => {
            let path = config.dictionary_path();
            let hash = DictionarySource::file(&path).content_hash()?;
            if *json {
                let stats = serde_json::json!({
                    "path": path,
                    "content_hash": hash,
                    "phrases": trie.phrase_count(),
                    "nodes": trie.node_count(),
                });
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Dictionary:    {}", path.display());
                println!("Content hash:  {hash}");
                println!("Phrases:       {}", trie.phrase_count());
                println!("Trie nodes:    {}", trie.node_count());
            }
        }
        DictCommand::Export { pretty } => {
            let mut stdout = std::io::stdout().lock();
            trie.write_nested_json(&mut stdout, *pretty)?;
            writeln!(stdout)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_cache(config: &Config, cmd: &CacheCommand) -> anyhow::Result<ExitCode> {
    let cache = SqliteTrieCache::from_config(&config.cache)?;

    match cmd {
        CacheCommand::Status { json } => {
            let stats = cache.stats()?;
            if *json {
                let status = serde_json::json!({
                    "enabled": config.cache.enabled,
                    "path": cache.path(),
                    "entries": stats.entries,
                    "expired_entries": stats.expired_entries,
                    "newest_entry": stats.newest_entry,
                    "db_size_bytes": stats.db_size_bytes,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Trie cache");
                println!("----------");
                println!("Enabled:       {}", config.cache.enabled);
                println!("Path:          {}", cache.path().display());
                println!("Entries:       {}", stats.entries);
                println!("Expired:       {}", stats.expired_entries);
                if let Some(newest) = stats.newest_entry {
                    println!("Newest entry:  {}", newest.to_rfc3339());
                }
                println!("Size (bytes):  {}", stats.db_size_bytes);
            }
        }
        CacheCommand::Clear => {
            let removed = cache.clear()?;
            println!("Removed {removed} cached tries.");
        }
        CacheCommand::Prune => {
            let removed = cache.prune_expired()?;
            println!("Removed {removed} expired cached tries.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Filter]");
                println!("  Max gap:            {}", config.filter.max_gap);
                println!("  Replacement:        {}", config.filter.replacement);
                println!("  Mode:               {:?}", config.filter.mode);
                println!();
                println!("[Dictionary]");
                println!("  Path:               {}", config.dictionary_path().display());
                println!("  Strict:             {}", config.dictionary.strict);
                println!();
                println!("[Cache]");
                println!("  Enabled:            {}", config.cache.enabled);
                println!("  Database path:      {}", config.cache_path().display());
                println!("  Expire (secs):      {}", config.cache.expire_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
