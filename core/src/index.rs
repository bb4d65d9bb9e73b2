use crate::ClusterId;
use std::collections::{HashMap, HashSet};

/// Token -> ids of the clusters whose profile contains the token.
///
/// Holds ids only; cluster data lives in [`crate::ClusterStore`].
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, HashSet<ClusterId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Register `cluster_id` under every token. Repeated calls are no-ops.
    pub fn update<'a, I>(&mut self, cluster_id: ClusterId, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            match self.postings.get_mut(token) {
                Some(ids) => { ids.insert(cluster_id); }
                None => { self.postings.insert(token.to_string(), HashSet::from([cluster_id])); }
            }
        }
    }

    /// Clusters matching at least `min_match` of `top_tokens`, ascending by id.
    pub fn candidates(&self, top_tokens: &[&str], min_match: usize) -> Vec<ClusterId> {
        let mut matches: HashMap<ClusterId, usize> = HashMap::new();
        for token in top_tokens {
            if let Some(ids) = self.postings.get(*token) {
                for id in ids {
                    *matches.entry(*id).or_insert(0) += 1;
                }
            }
        }
        let mut out: Vec<ClusterId> = matches
            .into_iter()
            .filter(|(_, n)| *n >= min_match)
            .map(|(id, _)| id)
            .collect();
        out.sort_unstable();
        out
    }

    /// Drop `cluster_id` from each token's set; tokens left without clusters are deleted.
    pub fn remove<'a, I>(&mut self, cluster_id: ClusterId, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            let now_empty = match self.postings.get_mut(token) {
                Some(ids) => {
                    ids.remove(&cluster_id);
                    ids.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.postings.remove(token);
            }
        }
    }

    pub fn clusters_for(&self, token: &str) -> Option<&HashSet<ClusterId>> {
        self.postings.get(token)
    }

    pub fn contains(&self, token: &str, cluster_id: ClusterId) -> bool {
        self.postings.get(token).map_or(false, |ids| ids.contains(&cluster_id))
    }

    /// Number of indexed tokens.
    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<ClusterId>)> {
        self.postings.iter().map(|(t, ids)| (t.as_str(), ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_idempotent() {
        let mut index = InvertedIndex::new();
        index.update(7, ["cat", "sat"]);
        index.update(7, ["cat"]);
        assert_eq!(index.clusters_for("cat").map(|s| s.len()), Some(1));
        assert!(index.contains("sat", 7));
    }

    #[test]
    fn candidates_respect_min_match() {
        let mut index = InvertedIndex::new();
        index.update(0, ["cat", "sat", "mat"]);
        index.update(1, ["cat", "dog"]);
        index.update(2, ["bird"]);

        assert_eq!(index.candidates(&["cat", "sat", "dog"], 1), vec![0, 1]);
        assert_eq!(index.candidates(&["cat", "sat", "dog"], 2), vec![0]);
        assert!(index.candidates(&["cat", "sat", "dog"], 3).is_empty());
        assert!(index.candidates(&["fish"], 1).is_empty());
    }

    #[test]
    fn remove_deletes_emptied_tokens() {
        let mut index = InvertedIndex::new();
        index.update(0, ["cat", "sat"]);
        index.update(1, ["cat"]);
        index.remove(0, ["cat", "sat"]);
        assert!(index.clusters_for("sat").is_none());
        assert!(!index.contains("cat", 0));
        assert!(index.contains("cat", 1));
        assert_eq!(index.len(), 1);
    }
}
