//! # askpti-cli: A terminal client for `askpti`
//!
//! Runs the assistant in-process. `chat` keeps the conversation history in
//! memory for the length of the session; nothing is persisted.

mod repl;

use anyhow::{Context, Result};
use askpti::{
    config::{get_config, present, AppConfig},
    load_corpus, Assistant, BlockingAssistant, TemplateVariant,
};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config file (defaults to ./config.yml when present)
    #[arg(long, global = true, env = "ASKPTI_CONFIG")]
    config: Option<String>,

    /// Template variant: restrictive, unrestricted_internal or system_split
    #[arg(long, global = true)]
    variant: Option<TemplateVariant>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        query: String,
    },
    /// Inspect or convert the corpus file
    Corpus(CorpusArgs),
}

#[derive(Parser, Debug)]
struct CorpusArgs {
    /// Corpus file to use instead of `corpus.path` from the config
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: CorpusCommands,
}

#[derive(Subcommand, Debug)]
enum CorpusCommands {
    /// Print the number of entries and characters in the corpus
    Stats,
    /// Write the corpus as one plain-text knowledge blob
    Flatten {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

// --- Main Application Entry ---

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging to a file
    let log_file = File::create("askpti-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref())?;
    let variant = cli.variant.unwrap_or(config.rooms.public.variant);

    match &cli.command {
        Commands::Chat => {
            let assistant = build_assistant(&config)?;
            info!(%variant, "Starting interactive chat.");
            let stdin = io::stdin();
            repl::run_chat_loop(stdin.lock(), io::stdout(), |query, history| {
                Ok(assistant.answer(variant, query, history)?.text)
            })?;
        }
        Commands::Ask { query } => {
            let assistant = build_assistant(&config)?;
            info!(%variant, "Answering one-shot query.");
            let reply = assistant.answer(variant, query, &[])?;
            println!("{}", reply.text);
        }
        Commands::Corpus(args) => handle_corpus(args, &config)?,
    }

    Ok(())
}

fn build_assistant(config: &AppConfig) -> Result<BlockingAssistant> {
    let assistant = Assistant::from_config(config).context("Failed to set up the assistant")?;
    BlockingAssistant::new(assistant).context("Failed to start the async runtime")
}

// --- Command Handlers ---

fn handle_corpus(args: &CorpusArgs, config: &AppConfig) -> Result<()> {
    let path = match &args.path {
        Some(path) => path.clone(),
        None => present(&config.corpus.path)
            .map(PathBuf::from)
            .context("No corpus configured. Set corpus.path or pass --path.")?,
    };
    let corpus = load_corpus(&path)?;

    match &args.command {
        CorpusCommands::Stats => {
            println!("entries: {}", corpus.len());
            println!("characters: {}", corpus.total_chars());
            let sourced = corpus.entries().iter().filter(|e| !e.url.is_empty()).count();
            println!("with source url: {sourced}");
        }
        CorpusCommands::Flatten { out } => {
            corpus.flatten_to(out)?;
            println!("Wrote {} entries to {}", corpus.len(), out.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "askpti",
            "ask",
            "Where is PTI located?",
            "--variant",
            "system-split",
            "--config",
            "custom.yml",
        ])
        .unwrap();

        assert_eq!(cli.variant, Some(TemplateVariant::SystemSplit));
        assert_eq!(cli.config.as_deref(), Some("custom.yml"));
        match cli.command {
            Commands::Ask { query } => assert_eq!(query, "Where is PTI located?"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_variant() {
        let result = Cli::try_parse_from(["askpti", "--variant", "freeform", "chat"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_corpus_flatten() {
        let cli =
            Cli::try_parse_from(["askpti", "corpus", "flatten", "--out", "pti.txt"]).unwrap();
        match cli.command {
            Commands::Corpus(CorpusArgs {
                path: None,
                command: CorpusCommands::Flatten { out },
            }) => assert_eq!(out, PathBuf::from("pti.txt")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
