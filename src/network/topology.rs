use std::collections::BTreeMap;

use crate::{Cost, NeighborMap, NodeId};

/// Link costs stored as two directed entries per link.
///
/// Every method writes both directions together, so `cost(a, b)` and
/// `cost(b, a)` can never disagree.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    costs: BTreeMap<(NodeId, NodeId), Cost>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: &str, b: &str, cost: Cost) {
        self.costs.insert((a.to_string(), b.to_string()), cost);
        self.costs.insert((b.to_string(), a.to_string()), cost);
    }

    pub fn update(&mut self, a: &str, b: &str, cost: Cost) -> bool {
        if !self.contains(a, b) {
            return false;
        }
        self.insert(a, b, cost);
        true
    }

    pub fn remove(&mut self, a: &str, b: &str) -> bool {
        let forward = self.costs.remove(&(a.to_string(), b.to_string()));
        let backward = self.costs.remove(&(b.to_string(), a.to_string()));
        forward.is_some() || backward.is_some()
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.costs.contains_key(&(a.to_string(), b.to_string()))
    }

    pub fn cost(&self, a: &str, b: &str) -> Option<Cost> {
        self.costs.get(&(a.to_string(), b.to_string())).copied()
    }

    pub fn neighbors(&self, node: &str) -> NeighborMap {
        self.costs
            .range((node.to_string(), NodeId::new())..)
            .take_while(|((src, _), _)| src == node)
            .map(|((_, dst), cost)| (dst.clone(), *cost))
            .collect()
    }

    /// Each link once, as `(a, b, cost)` with `a < b`.
    pub fn undirected(&self) -> Vec<(NodeId, NodeId, Cost)> {
        self.costs
            .iter()
            .filter(|((src, dst), _)| src < dst)
            .map(|((src, dst), cost)| (src.clone(), dst.clone(), *cost))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.costs.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn clear(&mut self) {
        self.costs.clear();
    }
}
