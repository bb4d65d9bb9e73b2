use anyhow::Result;
use clap::Parser;
use sclust::{run, Cli};
use sclust_core::Engine;
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // stdout carries records, so logs go to stderr
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let config = cli.engine_config()?;
    tracing::debug!(?config, "engine configuration");

    let mut engine = Engine::new(config)?;
    let outcome = run(&mut engine, io::stdin().lock(), io::stdout().lock(), cli.format)?;

    let summary = engine.summary();
    tracing::info!(
        documents = summary.documents,
        clusters = summary.clusters,
        indexed_tokens = summary.indexed_tokens,
        pruned = summary.pruned,
        ?outcome,
        "clustering finished"
    );
    Ok(())
}
