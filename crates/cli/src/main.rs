mod config;
mod error;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use council::{Council, Message};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "llm-council")]
#[command(about = "Ask a council of language models the same question", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to ./council.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one question to every council model and print the answers as JSON
    Ask {
        /// The question to ask
        question: String,
        /// Model to query (repeatable; replaces the configured council)
        #[arg(short, long = "model")]
        models: Vec<String>,
        /// Per-model deadline in seconds
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
    /// List the configured council models
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?.with_env();

    match cli.command {
        Commands::Ask {
            question,
            models,
            timeout,
        } => cmd_ask(config, question, models, timeout).await,
        Commands::Models => cmd_models(&config),
    }
}

async fn cmd_ask(
    mut config: Config,
    question: String,
    models: Vec<String>,
    timeout: Option<u64>,
) -> Result<()> {
    if !models.is_empty() {
        config.council.models = models;
    }
    if let Some(secs) = timeout {
        config.backend.timeout_secs = secs;
    }

    let backend = config.backend();
    info!(%backend, models = config.council.models.len(), "asking council");

    let council = Council::new(backend);
    let batch = council
        .query_all(config.council.models.as_slice(), &[Message::user(question)])
        .await;

    // Sorted keys keep the output stable between runs.
    let sorted: BTreeMap<_, _> = batch.into_iter().collect();
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &sorted)?;
    writeln!(stdout)?;
    Ok(())
}

fn cmd_models(config: &Config) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for model in &config.council.models {
        writeln!(stdout, "{model}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_accepts_positive_timeout() {
        let cli = Cli::try_parse_from(["llm-council", "ask", "--timeout", "5", "hi"]).unwrap();
        match cli.command {
            Commands::Ask { timeout, .. } => assert_eq!(timeout, Some(5)),
            Commands::Models => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn ask_rejects_zero_timeout() {
        let result = Cli::try_parse_from(["llm-council", "ask", "--timeout", "0", "hi"]);
        assert!(result.is_err());
    }

    #[test]
    fn repeated_model_flags_collect() {
        let cli = Cli::try_parse_from(["llm-council", "-v", "ask", "-m", "a", "-m", "b", "hi"])
            .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Ask { models, question, .. } => {
                assert_eq!(models, ["a", "b"]);
                assert_eq!(question, "hi");
            }
            Commands::Models => panic!("parsed the wrong subcommand"),
        }
    }
}
