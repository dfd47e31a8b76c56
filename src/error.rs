//! Error types for the clustering engine.

use thiserror::Error;

/// Errors raised while building, querying or expanding cluster indexes.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot build an index from an empty feature set")]
    EmptyIndex,

    #[error("No cluster with id {0}")]
    ClusterNotFound(usize),

    #[error("Feature {0} is a point, not a cluster")]
    NotACluster(usize),

    #[error("No index built for marker type '{0}'")]
    IndexNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClusterError>;
