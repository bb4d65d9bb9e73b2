use crate::cluster::ClusterStore;
use crate::config::EngineConfig;
use crate::error::{ClusterError, Result};
use crate::index::InvertedIndex;
use crate::stats::CorpusStats;
use crate::tokenizer::TokenBag;
use crate::weighting::WeightedDoc;
use crate::ClusterId;
use serde::Serialize;
use tracing::{debug, info};

/// Where a document ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub cluster_id: ClusterId,
    /// Winning similarity, or `None` when the document started a new cluster.
    pub score: Option<f64>,
}

impl Assignment {
    pub fn created(&self) -> bool { self.score.is_none() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineSummary {
    pub documents: u64,
    pub clusters: usize,
    pub indexed_tokens: usize,
    pub pruned: u64,
}

/// Single-pass greedy clusterer.
///
/// Each document is observed, weighted, matched against the clusters that
/// share its most discriminating tokens, and then either merged into the best
/// cluster above the threshold or used to seed a new one. Decisions are final.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    stats: CorpusStats,
    index: InvertedIndex,
    store: ClusterStore,
    pruned: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: CorpusStats::new(),
            index: InvertedIndex::new(),
            store: ClusterStore::new(),
            pruned: 0,
        })
    }

    /// Cluster one line of text. Returns `None` for lines without tokens.
    pub fn process(&mut self, line: &str) -> Result<Option<Assignment>> {
        let bag = TokenBag::from_text(line);
        self.process_bag(&bag)
    }

    pub fn process_bag(&mut self, bag: &TokenBag) -> Result<Option<Assignment>> {
        if bag.is_empty() {
            if self.config.count_empty_documents {
                self.stats.observe_empty();
                self.maybe_prune();
            }
            return Ok(None);
        }

        self.stats.observe(bag);
        let doc = WeightedDoc::new(bag, &self.stats)?;
        let candidates = self.candidates(&doc);
        let refresh = self.stats.doc_count() % self.config.norm_refresh == 0;

        let mut best: Option<(ClusterId, f64)> = None;
        for id in candidates {
            let cluster = self.store.get_mut(id).ok_or(ClusterError::UnknownCluster(id))?;
            let score = cluster.score(&doc, &self.stats, refresh)?;
            if score > self.config.threshold && best.map_or(true, |(_, top)| score > top) {
                best = Some((id, score));
            }
        }

        let assignment = match best {
            Some((cluster_id, score)) => {
                self.store.merge(cluster_id, bag)?;
                debug!(cluster_id, score, "merged document");
                Assignment { cluster_id, score: Some(score) }
            }
            None => {
                let cluster_id = self.store.create(bag);
                debug!(cluster_id, tokens = bag.len(), "created cluster");
                Assignment { cluster_id, score: None }
            }
        };
        self.index.update(assignment.cluster_id, bag.tokens());
        self.maybe_prune();
        Ok(Some(assignment))
    }

    /// Clusters worth scoring for `doc`, ascending by id.
    ///
    /// A document with fewer top tokens than `min_match` only has to match
    /// all of the tokens it has.
    pub fn candidates(&self, doc: &WeightedDoc<'_>) -> Vec<ClusterId> {
        let top = doc.top_tokens(self.config.top_tokens);
        let required = self.config.min_match.min(top.len());
        self.index.candidates(&top, required)
    }

    fn maybe_prune(&mut self) {
        if let Some(every) = self.config.prune_interval() {
            if self.stats.doc_count() % every == 0 {
                self.prune();
            }
        }
    }

    /// Drop clusters below the configured minimum size and unindex them.
    /// Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let removed = self.store.prune(self.config.prune_min_size);
        for cluster in &removed {
            self.index.remove(cluster.id(), cluster.tokens());
        }
        self.pruned += removed.len() as u64;
        info!(
            documents = self.stats.doc_count(),
            removed = removed.len(),
            remaining = self.store.len(),
            "pruned clusters"
        );
        removed.len()
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            documents: self.stats.doc_count(),
            clusters: self.store.len(),
            indexed_tokens: self.index.len(),
            pruned: self.pruned,
        }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn stats(&self) -> &CorpusStats { &self.stats }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn store(&self) -> &ClusterStore { &self.store }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(threshold: f64) -> Engine {
        Engine::new(EngineConfig { threshold, ..Default::default() }).unwrap()
    }

    #[test]
    fn first_document_creates_cluster_zero() {
        let mut e = engine(0.3);
        let a = e.process("hello world").unwrap().unwrap();
        assert_eq!(a, Assignment { cluster_id: 0, score: None });
        assert!(a.created());
        assert!(e.index().contains("hello", 0));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut e = engine(0.3);
        assert_eq!(e.process("  ... !! ").unwrap(), None);
        assert_eq!(e.stats().doc_count(), 1);
        assert!(e.store().is_empty());
    }

    #[test]
    fn unrelated_document_starts_new_cluster() {
        let mut e = engine(0.0);
        e.process("alpha beta").unwrap();
        let a = e.process("gamma delta").unwrap().unwrap();
        assert_eq!(a, Assignment { cluster_id: 1, score: None });
        assert_eq!(e.store().len(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = EngineConfig { min_match: 0, ..Default::default() };
        assert!(Engine::new(cfg).is_err());
    }
}
