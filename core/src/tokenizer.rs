use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\w+").expect("valid regex");
}

/// Tokenize text into lowercase runs of word characters, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Multiset of tokens for one document.
///
/// Backed by an ordered map so iteration (and therefore floating point
/// accumulation during scoring) is identical for equal bags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBag {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl TokenBag {
    pub fn new() -> Self { Self::default() }

    pub fn from_text(text: &str) -> Self {
        tokenize(text).into_iter().collect()
    }

    pub fn insert(&mut self, token: String) {
        *self.counts.entry(token).or_insert(0) += 1;
        self.total += 1;
    }

    /// Occurrences of `token`, zero when absent.
    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Sum of all multiplicities.
    pub fn total(&self) -> u64 { self.total }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

impl FromIterator<String> for TokenBag {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut bag = TokenBag::new();
        for token in iter {
            bag.insert(token);
        }
        bag
    }
}
