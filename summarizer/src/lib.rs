//! Rolling "top clusters" report over the record stream written by `sclust`.

use anyhow::Result;
use clap::Parser;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "sclust-summarize")]
#[command(about = "Print the largest clusters from an sclust output stream", long_about = None)]
pub struct Cli {
    /// Print a report every F lines (0 prints only at end of input)
    #[arg(short, long, default_value_t = 1000)]
    pub frequency: u64,
    /// Number of top clusters to print
    #[arg(short = 'n', long, default_value_t = 10)]
    pub num_clusters_to_print: usize,
    /// Number of records to keep and print per cluster
    #[arg(short = 'k', long, default_value_t = 1)]
    pub num_docs_to_print: usize,
}

#[derive(Debug)]
struct Tally {
    count: u64,
    first_seen: u64,
    recent: VecDeque<String>,
}

#[derive(Debug)]
pub struct Summarizer {
    num_clusters: usize,
    num_docs: usize,
    lines: u64,
    clusters: HashMap<String, Tally>,
}

impl Summarizer {
    pub fn new(num_clusters: usize, num_docs: usize) -> Self {
        Self { num_clusters, num_docs: num_docs.max(1), lines: 0, clusters: HashMap::new() }
    }

    /// Count one record under the cluster id in its first field.
    pub fn observe(&mut self, record: &str) {
        let record = record.trim();
        let id = record.split('\t').next().unwrap_or_default().to_string();
        let seen = self.clusters.len() as u64;
        let tally = self.clusters.entry(id).or_insert_with(|| Tally {
            count: 0,
            first_seen: seen,
            recent: VecDeque::new(),
        });
        tally.count += 1;
        if tally.recent.len() == self.num_docs {
            tally.recent.pop_front();
        }
        tally.recent.push_back(record.to_string());
        self.lines += 1;
    }

    pub fn lines(&self) -> u64 { self.lines }

    pub fn cluster_count(&self) -> usize { self.clusters.len() }

    /// Largest clusters first; equal counts keep the cluster seen first.
    pub fn top(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&String, &Tally)> = self.clusters.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.count.cmp(&a.1.count).then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        ranked
            .into_iter()
            .take(self.num_clusters)
            .map(|(id, t)| (id.as_str(), t.count))
            .collect()
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (lines, clusters) = (self.lines, self.clusters.len());
        writeln!(out, "\n---------{lines} documents, {clusters} clusters---------\n")?;
        for (id, count) in self.top() {
            let Some(tally) = self.clusters.get(id) else { continue };
            let mut records = tally.recent.iter();
            if let Some(first) = records.next() {
                writeln!(out, "{count}\t{first}")?;
            }
            for record in records {
                let rest: Vec<&str> = record.split('\t').skip(1).collect();
                writeln!(out, " \t \t{}", rest.join("\t"))?;
            }
        }
        out.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    OutputClosed,
}

/// Feed every input line to `summarizer`, reporting every `frequency` lines and at the end.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the run.
pub fn run<R: BufRead, W: Write>(
    summarizer: &mut Summarizer,
    mut input: R,
    mut output: W,
    frequency: u64,
) -> Result<RunOutcome> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        summarizer.observe(&String::from_utf8_lossy(&buf));
        if frequency > 0 && summarizer.lines() % frequency == 0 {
            if let Some(outcome) = report(summarizer, &mut output)? {
                return Ok(outcome);
            }
        }
    }
    Ok(report(summarizer, &mut output)?.unwrap_or(RunOutcome::Completed))
}

fn report<W: Write>(summarizer: &Summarizer, output: &mut W) -> Result<Option<RunOutcome>> {
    match summarizer.write_report(output) {
        Ok(()) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("output closed, stopping");
            Ok(Some(RunOutcome::OutputClosed))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_records() {
        let mut s = Summarizer::new(10, 2);
        for r in ["0\ta\tNA", "0\tb\t0.9", "0\tc\t0.8"] {
            s.observe(r);
        }
        let tally = &s.clusters["0"];
        assert_eq!(tally.count, 3);
        assert_eq!(tally.recent, vec!["0\tb\t0.9".to_string(), "0\tc\t0.8".to_string()]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut s = Summarizer::new(2, 1);
        for r in ["5\tx\tNA", "3\ty\tNA", "9\tz\tNA", "9\tz2\t0.9"] {
            s.observe(r);
        }
        assert_eq!(s.top(), vec![("9", 2), ("5", 1)]);
    }
}
