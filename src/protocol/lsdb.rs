use std::collections::BTreeMap;

use crate::algorithms::TopologyGraph;
use crate::{Cost, NeighborMap, NodeId};

use super::Lsa;

/// Per-router link-state database plus the sequence high-water marks that
/// decide which advertisements are fresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkStateDatabase {
    entries: BTreeMap<NodeId, NeighborMap>,
    sequences: BTreeMap<NodeId, u64>,
}

impl LinkStateDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh database holding only the local node's links at sequence 1.
    pub fn seeded(own_id: &str, neighbors: NeighborMap) -> Self {
        let mut db = Self::new();
        db.entries.insert(own_id.to_string(), neighbors);
        db.sequences.insert(own_id.to_string(), 1);
        db
    }

    /// Installs `lsa` if its sequence is above the recorded high-water mark.
    ///
    /// An accepted LSA replaces the origin's whole neighbor set. Returns
    /// whether the database changed.
    pub fn accept(&mut self, lsa: &Lsa) -> bool {
        if lsa.sequence <= self.sequence_of(&lsa.origin) {
            return false;
        }
        self.entries.insert(lsa.origin.clone(), lsa.neighbors.clone());
        self.sequences.insert(lsa.origin.clone(), lsa.sequence);
        true
    }

    /// Applies a local link change to `own_id`'s entry and bumps its
    /// sequence. An infinite cost removes the neighbor.
    pub fn apply_local_change(&mut self, own_id: &str, neighbor: &str, cost: Cost) -> u64 {
        let entry = self.entries.entry(own_id.to_string()).or_default();
        if cost.is_infinite() {
            entry.remove(neighbor);
        } else {
            entry.insert(neighbor.to_string(), cost);
        }

        let sequence = self.sequences.entry(own_id.to_string()).or_insert(0);
        *sequence += 1;
        *sequence
    }

    /// Highest sequence accepted for `node`, 0 if none.
    pub fn sequence_of(&self, node: &str) -> u64 {
        self.sequences.get(node).copied().unwrap_or(0)
    }

    pub fn entry(&self, node: &str) -> Option<&NeighborMap> {
        self.entries.get(node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn own_lsa(&self, own_id: &str) -> Lsa {
        let sequence = self.sequences.get(own_id).copied().unwrap_or(1);
        let neighbors = self.entries.get(own_id).cloned().unwrap_or_default();
        Lsa::new(own_id, sequence, neighbors)
    }

    /// Flattens every entry into a graph. Nodes seen only as somebody's
    /// neighbor get an empty adjacency so every node is a key.
    pub fn to_topology(&self) -> TopologyGraph {
        let mut topology = TopologyGraph::new();

        for (node_id, neighbors) in &self.entries {
            let adjacency = topology.entry(node_id.clone()).or_default();
            for (neighbor, cost) in neighbors {
                adjacency.insert(neighbor.clone(), *cost);
            }
            for neighbor in neighbors.keys() {
                topology.entry(neighbor.clone()).or_default();
            }
        }

        topology
    }
}
