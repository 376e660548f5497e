//! Run path for the `disambig` binary: scan, classify, report, persist.

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use disambig_corpus::read_corpus;
use disambig_dispatch::{DispatchResult, classify};
use disambig_types::{CorpusKeys, index_is_set};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no corpus files supplied")]
    NoInput,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub category_key: String,
    pub files: Vec<PathBuf>,
    pub lemma_key: String,
    pub index_key: String,
    pub prefix: String,
    pub noise_threshold: u64,
}

/// Scan the corpus, classify every lemma, print the summary to stdout and
/// write the three lookup-table artifacts next to `prefix`.
pub fn run(config: &RunConfig) -> Result<()> {
    if config.files.is_empty() {
        return Err(CliError::NoInput.into());
    }

    let keys = CorpusKeys {
        lemma: config.lemma_key.clone(),
        category: config.category_key.clone(),
        index: config.index_key.clone(),
    };

    let start = Instant::now();
    let table = read_corpus(&config.files, &keys, index_is_set)?;
    info!(
        "{} lemmas aggregated in {} ms",
        table.lemma_count(),
        start.elapsed().as_millis()
    );

    let start = Instant::now();
    let dispatched = classify(&table, config.noise_threshold);
    info!("classified in {} ms", start.elapsed().as_millis());

    print!("{}", render_summary(&dispatched));
    write_artifacts(config, &dispatched)
}

/// The human-readable report: per index-cardinality bucket the totals and
/// the share resolved automatically, then the mixed totals.
pub fn render_summary(result: &DispatchResult) -> String {
    let mut out = String::new();
    let mut total = 0u64;
    let mut auto = 0u64;

    let _ = writeln!(out, "--- Summary ---\n");
    for (cardinality, bucket) in &result.per_cardinality {
        total += bucket.total;
        auto += bucket.auto;
        let _ = writeln!(out, "Lemma with {cardinality} distinct senses");
        let _ = writeln!(out, "--- Total: {}", bucket.total);
        let _ = writeln!(out, "--- Auto.: {}", bucket.auto);
        let _ = writeln!(out, "--- Auto%: {:.2}", percent(bucket.auto, bucket.total));
    }
    let _ = writeln!(out, "Mixed");
    let _ = writeln!(out, "--- Total: {total}");
    let _ = writeln!(out, "--- Auto.: {auto}");
    let _ = writeln!(out, "--- Auto%: {:.2}", percent(auto, total));
    let _ = writeln!(
        out,
        "{} lemma with partial automatization possible",
        result.partial.len()
    );
    let _ = writeln!(
        out,
        "{} lemma with no automatization possible",
        result.uncategorizable.len()
    );
    let _ = writeln!(
        out,
        "{} lemma with no secondary disambiguation needed",
        result.single_answer.len()
    );
    out
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn write_artifacts(config: &RunConfig, result: &DispatchResult) -> Result<()> {
    let category_path = format!("{}{}.json", config.prefix, config.category_key);
    write_json(&category_path, &result.category_table)?;
    let straight_path = format!("{}straight.json", config.prefix);
    write_json(&straight_path, &result.single_answer)?;
    let needs_path = format!("{}needs.json", config.prefix);
    write_json(&needs_path, &result.review_pool())?;
    info!("wrote {category_path}, {straight_path}, {needs_path}");
    Ok(())
}

fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {path}"))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("serialize {path}"))?;
    Ok(())
}
