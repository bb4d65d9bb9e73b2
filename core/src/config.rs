use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for [`crate::Engine`].
///
/// Deserializes from partial documents; absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum similarity (exclusive) for a document to join an existing cluster.
    pub threshold: f64,
    /// How many of a document's top tokens a cluster must share to be scored.
    pub min_match: usize,
    /// Number of highest-IDF document tokens used for the index lookup.
    pub top_tokens: usize,
    /// Prune every this many documents; `None` disables pruning.
    pub prune_frequency: Option<u64>,
    /// Clusters with fewer documents than this are dropped by a prune.
    pub prune_min_size: u64,
    /// Recompute cached cluster norms every this many documents.
    pub norm_refresh: u64,
    /// Whether a line without tokens still advances the document count.
    /// On by default: blank lines dilute IDF and move the prune and norm
    /// refresh schedules exactly like any other line.
    pub count_empty_documents: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            min_match: 2,
            top_tokens: 5,
            prune_frequency: None,
            prune_min_size: 3,
            norm_refresh: 1,
            count_empty_documents: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            let msg = format!("threshold must be in [0, 1], got {}", self.threshold);
            return Err(ClusterError::InvalidConfig(msg));
        }
        if self.min_match == 0 {
            return Err(ClusterError::InvalidConfig("min_match must be at least 1".into()));
        }
        if self.top_tokens == 0 {
            return Err(ClusterError::InvalidConfig("top_tokens must be at least 1".into()));
        }
        if self.norm_refresh == 0 {
            return Err(ClusterError::InvalidConfig("norm_refresh must be at least 1".into()));
        }
        Ok(())
    }

    /// Prune interval with the `0` sentinel treated as disabled.
    pub fn prune_interval(&self) -> Option<u64> {
        self.prune_frequency.filter(|p| *p > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let cfg = EngineConfig { threshold: 1.5, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ClusterError::InvalidConfig(_))));
        let cfg = EngineConfig { threshold: f64::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_prune_frequency_disables_pruning() {
        let cfg = EngineConfig { prune_frequency: Some(0), ..Default::default() };
        assert_eq!(cfg.prune_interval(), None);
        let cfg = EngineConfig { prune_frequency: Some(50), ..Default::default() };
        assert_eq!(cfg.prune_interval(), Some(50));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{"threshold": 0.3, "prune_frequency": 100}"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.threshold, 0.3);
        assert_eq!(cfg.prune_frequency, Some(100));
        assert_eq!(cfg.min_match, 2);
        assert!(cfg.count_empty_documents);
    }
}
