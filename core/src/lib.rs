pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod shared;
pub mod stats;
pub mod tokenizer;
pub mod weighting;

pub type ClusterId = u64;

pub use cluster::{Cluster, ClusterStore};
pub use config::EngineConfig;
pub use engine::{Assignment, Engine, EngineSummary};
pub use error::{ClusterError, Result};
pub use index::InvertedIndex;
pub use shared::SharedEngine;
pub use stats::CorpusStats;
pub use tokenizer::{tokenize, TokenBag};
pub use weighting::WeightedDoc;
