use crate::error::Result;
use crate::stats::CorpusStats;
use crate::tokenizer::TokenBag;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A document together with the IDF weights in effect while it is processed.
///
/// Built after the document has been observed, so every token has a
/// non-zero document frequency.
#[derive(Debug, Clone)]
pub struct WeightedDoc<'a> {
    bag: &'a TokenBag,
    weights: BTreeMap<&'a str, f64>,
    norm: f64,
}

impl<'a> WeightedDoc<'a> {
    pub fn new(bag: &'a TokenBag, stats: &CorpusStats) -> Result<Self> {
        let mut weights = BTreeMap::new();
        let mut sq = 0.0f64;
        for (token, count) in bag.iter() {
            let w = stats.weight(token)?;
            let v = count as f64 * w;
            sq += v * v;
            weights.insert(token, w);
        }
        Ok(Self { bag, weights, norm: sq.sqrt() })
    }

    pub fn bag(&self) -> &'a TokenBag { self.bag }

    /// IDF of a document token, zero for tokens outside the document.
    pub fn weight(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// Euclidean length of the count * idf vector.
    pub fn norm(&self) -> f64 { self.norm }

    /// The `n` most discriminating tokens: highest IDF first, ties by token text.
    pub fn top_tokens(&self, n: usize) -> Vec<&'a str> {
        let mut ranked: Vec<(&'a str, f64)> = self.weights.iter().map(|(t, w)| (*t, *w)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0))
        });
        ranked.into_iter().take(n).map(|(t, _)| t).collect()
    }
}
