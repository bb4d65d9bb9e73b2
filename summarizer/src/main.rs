use anyhow::Result;
use clap::Parser;
use sclust_summarize::{run, Cli, Summarizer};
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let mut summarizer = Summarizer::new(cli.num_clusters_to_print, cli.num_docs_to_print);
    let outcome = run(&mut summarizer, io::stdin().lock(), io::stdout().lock(), cli.frequency)?;
    tracing::info!(
        lines = summarizer.lines(),
        clusters = summarizer.cluster_count(),
        ?outcome,
        "summary finished"
    );
    Ok(())
}
