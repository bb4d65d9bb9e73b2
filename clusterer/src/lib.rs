use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sclust_core::{Assignment, ClusterId, Engine, EngineConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Written in the score column when a line started a new cluster.
pub const NEW_CLUSTER: &str = "NA";

#[derive(Parser, Debug)]
#[command(name = "sclust")]
#[command(about = "Cluster a stream of sentences read one per line from stdin", long_about = None)]
pub struct Cli {
    /// JSON file with engine settings; flags given here override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Similarity threshold in [0,1]; higher means lines must be more alike to merge [default: 0.8]
    #[arg(short, long)]
    pub threshold: Option<f64>,
    /// Top tokens a cluster must share with a line to be scored [default: 2]
    #[arg(long)]
    pub min_match: Option<usize>,
    /// Highest-IDF tokens of each line used for the index lookup [default: 5]
    #[arg(long)]
    pub top_tokens: Option<usize>,
    /// Prune small clusters every N documents; 0 disables pruning [default: 0]
    #[arg(short, long)]
    pub prune_frequency: Option<u64>,
    /// Clusters with fewer documents than this are pruned [default: 3]
    #[arg(long)]
    pub min_size: Option<u64>,
    /// Recompute cluster norms every N documents [default: 1]
    #[arg(short, long)]
    pub update_norms: Option<u64>,
    /// Do not count lines without tokens toward the document total
    #[arg(long, default_value_t = false)]
    pub skip_empty: bool,
    /// Output record format
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,
}

impl Cli {
    /// Defaults, then the config file, then command line flags.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };
        if let Some(t) = self.threshold { cfg.threshold = t; }
        if let Some(m) = self.min_match { cfg.min_match = m; }
        if let Some(n) = self.top_tokens { cfg.top_tokens = n; }
        if let Some(p) = self.prune_frequency { cfg.prune_frequency = Some(p); }
        if let Some(s) = self.min_size { cfg.prune_min_size = s; }
        if let Some(u) = self.update_norms { cfg.norm_refresh = u; }
        if self.skip_empty { cfg.count_empty_documents = false; }
        cfg.prune_frequency = cfg.prune_interval();
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let cfg = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `cluster_id<TAB>line<TAB>score`
    Tsv,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    cluster_id: ClusterId,
    text: &'a str,
    score: Option<f64>,
}

pub fn format_record(assignment: &Assignment, line: &str, format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Tsv => match assignment.score {
            Some(score) => format!("{}\t{}\t{:.6}", assignment.cluster_id, line, score),
            None => format!("{}\t{}\t{}", assignment.cluster_id, line, NEW_CLUSTER),
        },
        OutputFormat::Json => serde_json::to_string(&JsonRecord {
            cluster_id: assignment.cluster_id,
            text: line,
            score: assignment.score,
        })?,
    };
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Input was read to the end.
    Completed,
    /// The reader on the other end of the output went away.
    OutputClosed,
}

/// Cluster every line of `input`, writing one flushed record per assigned line.
pub fn run<R: BufRead, W: Write>(
    engine: &mut Engine,
    mut input: R,
    mut output: W,
    format: OutputFormat,
) -> Result<RunOutcome> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(RunOutcome::Completed);
        }
        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim();
        let Some(assignment) = engine.process(line)? else { continue };
        let record = format_record(&assignment, line, format)?;
        if let Err(e) = writeln!(output, "{record}").and_then(|_| output.flush()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!("output closed, stopping");
                return Ok(RunOutcome::OutputClosed);
            }
            return Err(e.into());
        }
    }
}
