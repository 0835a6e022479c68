mod ask;
mod cli;
mod ingest;
mod logging;
mod stats;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = if cli.verbose {
        true
    } else {
        logging::env_flag()
    };
    logging::init(verbose);
    match cli.command {
        Command::Ingest {
            input,
            store,
            chunk_chars,
            embedder,
        } => ingest::run(input, store, chunk_chars, embedder).await,
        Command::Ask {
            question,
            store,
            threshold,
        } => ask::run(question, store, threshold).await,
        Command::Stats { store } => stats::run(store),
    }
}
