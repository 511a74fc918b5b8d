//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

/// Seats four robots at a table and plays tractor on a virtual clock,
/// printing each round's summary as a line of JSON.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file with timing overrides.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for shuffles and robots. Overrides the config file.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Stop after this many rounds, even if nobody has won.
    #[arg(short, long)]
    pub rounds: Option<usize>,

    /// Log filter, used when RUST_LOG is unset.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}
