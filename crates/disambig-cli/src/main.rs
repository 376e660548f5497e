use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use disambig_cli::{RunConfig, run};
use disambig_dispatch::DEFAULT_NOISE_THRESHOLD;
use disambig_types::{DEFAULT_INDEX_KEY, DEFAULT_LEMMA_KEY};

/// Scan a lemmatized, tagged corpus and decide which lemmas a secondary
/// tag (part of speech, gender, ...) can disambiguate automatically.
#[derive(Parser)]
#[command(name = "disambig")]
struct Cli {
    /// Column holding the secondary tag to scan.
    category_key: String,

    /// Tab-separated corpus files with a header row.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Column holding the lemma.
    #[arg(long, default_value = DEFAULT_LEMMA_KEY)]
    lemma_key: String,

    /// Column holding the disambiguation index.
    #[arg(long = "dis-key", default_value = DEFAULT_INDEX_KEY)]
    index_key: String,

    /// Prefix for the generated JSON artifacts.
    #[arg(long, default_value = "./")]
    prefix: String,

    /// Count at or below which an (index, tag) pair is treated as noise.
    #[arg(long, default_value_t = DEFAULT_NOISE_THRESHOLD)]
    noise_threshold: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(&RunConfig {
        category_key: cli.category_key,
        files: cli.files,
        lemma_key: cli.lemma_key,
        index_key: cli.index_key,
        prefix: cli.prefix,
        noise_threshold: cli.noise_threshold,
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
