use thiserror::Error;

use crate::{Cost, NodeId};

/// Failure to load or save a topology file.
///
/// A load that returns any of these leaves the live topology untouched.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("topology file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed topology file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("link {from} - {to} references unknown node {missing}")]
    UnknownEndpoint {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    #[error("link {from} - {to} has invalid cost {cost}")]
    InvalidCost {
        from: NodeId,
        to: NodeId,
        cost: Cost,
    },

    #[error("link {0} - {0} connects a node to itself")]
    SelfLoop(NodeId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("advertisement window {min_ms}..={max_ms} ms is empty")]
    InvalidWindow { min_ms: u64, max_ms: u64 },

}
