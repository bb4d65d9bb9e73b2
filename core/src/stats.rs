use crate::error::{ClusterError, Result};
use crate::tokenizer::TokenBag;
use std::collections::HashMap;

/// Streaming document-frequency statistics.
#[derive(Debug, Default, Clone)]
pub struct CorpusStats {
    doc_count: u64,
    doc_freq: HashMap<String, u64>,
}

impl CorpusStats {
    pub fn new() -> Self { Self::default() }

    /// Record one document: every distinct token's frequency goes up by one,
    /// regardless of how often it occurs in the document.
    pub fn observe(&mut self, bag: &TokenBag) {
        self.doc_count += 1;
        for token in bag.tokens() {
            *self.doc_freq.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    /// Count a document that produced no tokens.
    pub fn observe_empty(&mut self) {
        self.doc_count += 1;
    }

    /// `log10((doc_count + 1) / doc_freq)`, recomputed on every call.
    pub fn weight(&self, token: &str) -> Result<f64> {
        match self.doc_freq(token) {
            0 => Err(ClusterError::UnobservedToken(token.to_string())),
            df => Ok(((self.doc_count + 1) as f64 / df as f64).log10()),
        }
    }

    pub fn doc_count(&self) -> u64 { self.doc_count }

    /// Document frequency of `token`, zero when never seen.
    pub fn doc_freq(&self, token: &str) -> u64 {
        self.doc_freq.get(token).copied().unwrap_or(0)
    }

    pub fn vocabulary_len(&self) -> usize { self.doc_freq.len() }
}
