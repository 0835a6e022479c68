use clap::{ArgAction, Parser, Subcommand};

use fagsvar_core::DEFAULT_CHUNK_CHARS;
use fagsvar_rag::DEFAULT_SIMILARITY_THRESHOLD;

#[derive(Parser, Debug)]
#[command(name = "fagsvar", about = "fagsvar corpus and query CLI")]
pub struct Cli {
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Ingest {
        input: String,
        #[arg(long, default_value = "data/embeddings.json")]
        store: String,
        #[arg(long, default_value_t = DEFAULT_CHUNK_CHARS)]
        chunk_chars: usize,
        #[arg(long, default_value = "env")]
        embedder: String,
    },
    Ask {
        question: String,
        #[arg(long, default_value = "data/embeddings.json")]
        store: String,
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f32,
    },
    Stats {
        #[arg(long, default_value = "data/embeddings.json")]
        store: String,
    },
}
