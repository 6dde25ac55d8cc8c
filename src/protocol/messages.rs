use serde::{Deserialize, Serialize};

use crate::{NeighborMap, NodeId};

/// Link State Advertisement: one node's view of its own links.
///
/// An `Lsa` owns its neighbor map. Once built it is never aliased with the
/// originating LSDB entry, so it can sit in an inbox while the origin keeps
/// changing its links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lsa {
    pub origin: NodeId,
    pub sequence: u64,
    pub neighbors: NeighborMap,
}

impl Lsa {
    pub fn new(origin: impl Into<NodeId>, sequence: u64, neighbors: NeighborMap) -> Self {
        Self {
            origin: origin.into(),
            sequence,
            neighbors,
        }
    }
}

