//! Error type for the clustering engine.
//!
//! Everything here other than `InvalidConfig` means the engine's own
//! bookkeeping is broken; callers are expected to stop the run.

use crate::ClusterId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Error, PartialEq)]
pub enum ClusterError {
    /// IDF was requested for a token that no observed document contained
    #[error("token {0:?} has zero document frequency")]
    UnobservedToken(String),

    /// The inverted index referenced a cluster the store does not hold
    #[error("cluster {0} is indexed but missing from the store")]
    UnknownCluster(ClusterId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
