//! Cluster profiles and the store that owns them.
//!
//! A profile maps each token to its share of all tokens ever merged into the
//! cluster, so the shares always sum to one. Similarity is the cosine between
//! the document's `count * idf` vector and the profile's `share * idf` vector,
//! using the IDF weights current for the incoming document.

use crate::error::{ClusterError, Result};
use crate::stats::CorpusStats;
use crate::tokenizer::TokenBag;
use crate::weighting::WeightedDoc;
use crate::ClusterId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    term_scores: BTreeMap<String, f64>,
    total_tokens: u64,
    size: u64,
    /// Unit-length `share * idf` vector, as of the last refresh.
    normed: Option<BTreeMap<String, f64>>,
}

impl Cluster {
    /// Start a cluster from its first document.
    pub fn new(id: ClusterId, bag: &TokenBag) -> Self {
        let total = bag.total();
        let term_scores = bag
            .iter()
            .map(|(t, c)| (t.to_string(), c as f64 / total.max(1) as f64))
            .collect();
        Self { id, term_scores, total_tokens: total, size: 1, normed: None }
    }

    /// Fold a document into the running profile.
    ///
    /// Existing shares are rescaled to the new token mass and tokens new to
    /// the cluster enter with `count / new_total`.
    pub fn merge(&mut self, bag: &TokenBag) {
        let old_total = self.total_tokens as f64;
        let new_total = self.total_tokens + bag.total();
        let denom = new_total.max(1) as f64;
        for (token, share) in self.term_scores.iter_mut() {
            *share = (*share * old_total + bag.count(token) as f64) / denom;
        }
        for (token, count) in bag.iter() {
            if !self.term_scores.contains_key(token) {
                self.term_scores.insert(token.to_string(), count as f64 / denom);
            }
        }
        self.total_tokens = new_total;
        self.size += 1;
        self.normed = None;
    }

    /// Cosine similarity against `doc`, in [0, 1].
    ///
    /// The cluster side is a cached unit vector. `refresh` rebuilds it from the
    /// current statistics; otherwise it is only rebuilt after a merge. A stale
    /// vector is still unit length, so the score never exceeds one.
    pub fn score(
        &mut self,
        doc: &WeightedDoc<'_>,
        stats: &CorpusStats,
        refresh: bool,
    ) -> Result<f64> {
        if refresh || self.normed.is_none() {
            self.normed = Some(normalized_profile(&self.term_scores, stats)?);
        }
        let Some(normed) = &self.normed else { return Ok(0.0) };
        let mut dot = 0.0f64;
        for (token, count) in doc.bag().iter() {
            let c = normed.get(token).copied().unwrap_or(0.0);
            dot += count as f64 * doc.weight(token) * c;
        }
        if dot == 0.0 || doc.norm() == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / doc.norm())
    }

    pub fn id(&self) -> ClusterId { self.id }

    /// Profile share of `token`, zero when the cluster has never seen it.
    pub fn term_score(&self, token: &str) -> f64 {
        self.term_scores.get(token).copied().unwrap_or(0.0)
    }

    pub fn term_scores(&self) -> &BTreeMap<String, f64> { &self.term_scores }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.term_scores.keys().map(String::as_str)
    }

    pub fn total_tokens(&self) -> u64 { self.total_tokens }

    /// Documents merged so far, including the one that created the cluster.
    pub fn size(&self) -> u64 { self.size }
}

/// `share * idf` for every profile token, scaled to unit length.
fn normalized_profile(
    term_scores: &BTreeMap<String, f64>,
    stats: &CorpusStats,
) -> Result<BTreeMap<String, f64>> {
    let mut weighted = BTreeMap::new();
    let mut sq = 0.0f64;
    for (token, share) in term_scores {
        let v = share * stats.weight(token)?;
        sq += v * v;
        weighted.insert(token.clone(), v);
    }
    let norm = sq.sqrt();
    if norm > 0.0 {
        for v in weighted.values_mut() {
            *v /= norm;
        }
    }
    Ok(weighted)
}

/// Owns every live cluster, keyed and iterated by id.
#[derive(Debug, Default, Clone)]
pub struct ClusterStore {
    clusters: BTreeMap<ClusterId, Cluster>,
    next_id: ClusterId,
}

impl ClusterStore {
    pub fn new() -> Self { Self::default() }

    /// Create a cluster from `bag` under a fresh id. Ids are never reused.
    pub fn create(&mut self, bag: &TokenBag) -> ClusterId {
        let id = self.next_id;
        self.next_id += 1;
        self.clusters.insert(id, Cluster::new(id, bag));
        id
    }

    pub fn merge(&mut self, id: ClusterId, bag: &TokenBag) -> Result<()> {
        let cluster = self.clusters.get_mut(&id).ok_or(ClusterError::UnknownCluster(id))?;
        cluster.merge(bag);
        Ok(())
    }

    /// Remove every cluster smaller than `min_size`, returning the removed ones.
    pub fn prune(&mut self, min_size: u64) -> Vec<Cluster> {
        let doomed: Vec<ClusterId> = self
            .clusters
            .values()
            .filter(|c| c.size < min_size)
            .map(|c| c.id)
            .collect();
        doomed.into_iter().filter_map(|id| self.clusters.remove(&id)).collect()
    }

    pub fn get(&self, id: ClusterId) -> Option<&Cluster> { self.clusters.get(&id) }

    pub fn get_mut(&mut self, id: ClusterId) -> Option<&mut Cluster> { self.clusters.get_mut(&id) }

    pub fn len(&self) -> usize { self.clusters.len() }

    pub fn is_empty(&self) -> bool { self.clusters.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> { self.clusters.values() }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cluster> { self.clusters.values_mut() }
}
