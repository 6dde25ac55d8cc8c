use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::ShortestPath;
use crate::{Cost, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingTable {
    entries: BTreeMap<NodeId, RoutingEntry>,
    computed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub destination: NodeId,
    pub next_hop: NodeId,
    pub distance: Cost,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            computed_at: None,
        }
    }

    pub fn from_paths(paths: BTreeMap<NodeId, ShortestPath>) -> Self {
        let entries = paths
            .into_iter()
            .map(|(destination, path)| {
                let entry = RoutingEntry {
                    destination: destination.clone(),
                    next_hop: path.next_hop,
                    distance: path.cost,
                };
                (destination, entry)
            })
            .collect();

        Self {
            entries,
            computed_at: Some(Utc::now()),
        }
    }

    pub fn get_route(&self, destination: &str) -> Option<&RoutingEntry> {
        self.entries.get(destination)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&NodeId> {
        self.entries.get(destination).map(|entry| &entry.next_hop)
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.entries.contains_key(destination)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &RoutingEntry)> {
        self.entries.iter()
    }

    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.computed_at
    }

    /// True when both tables route every destination the same way,
    /// regardless of when each was computed.
    pub fn same_routes(&self, other: &RoutingTable) -> bool {
        self.entries == other.entries
    }
}
