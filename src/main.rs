use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod deck;
mod french;
mod tractor;
use self::args::Args;
use self::tractor::{Config, Table};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);
    let config = load_config(&args)?;

    let mut table = Table::with_robots(config).context("failed to open table")?;
    let summaries = table
        .run(args.rounds.unwrap_or(usize::MAX))
        .context("game aborted")?;
    for summary in summaries {
        println!("{}", serde_json::to_string(summary)?);
    }
    if let Some(team) = table.winner() {
        info!(%team, rounds = table.summaries().len(), "winner");
    }
    Ok(())
}
