use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::{Cost, NeighborMap, NodeId};

/// Directed view of the network: node -> (neighbor -> cost).
pub type TopologyGraph = BTreeMap<NodeId, NeighborMap>;

#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub next_hop: NodeId,
    pub cost: Cost,
}

#[derive(Debug)]
struct State {
    cost: Cost,
    router: NodeId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths over `topology`, keyed by destination.
///
/// The source itself never appears in the result, and neither does any
/// destination without a finite-cost path. Equal-cost alternatives are
/// resolved by heap pop order: stable for a given graph, but not chosen by
/// any rule a caller should rely on.
pub fn calculate_shortest_paths(topology: &TopologyGraph, source: &str) -> BTreeMap<NodeId, ShortestPath> {
    let mut distances: HashMap<NodeId, Cost> = HashMap::new();
    let mut previous: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for router_id in topology.keys() {
        distances.insert(router_id.clone(), Cost::INFINITY);
        previous.insert(router_id.clone(), None);
    }
    distances.insert(source.to_string(), 0.0);

    heap.push(State {
        cost: 0.0,
        router: source.to_string(),
    });

    while let Some(State { cost, router }) = heap.pop() {
        // Superseded queue entry
        if cost > distance_of(&distances, &router) {
            continue;
        }

        let Some(neighbors) = topology.get(&router) else {
            continue;
        };

        for (neighbor, link_cost) in neighbors {
            let new_cost = cost + link_cost;

            if new_cost < distance_of(&distances, neighbor) {
                distances.insert(neighbor.clone(), new_cost);
                previous.insert(neighbor.clone(), Some(router.clone()));

                heap.push(State {
                    cost: new_cost,
                    router: neighbor.clone(),
                });
            }
        }
    }

    let mut paths = BTreeMap::new();

    for destination in topology.keys() {
        if destination == source {
            continue;
        }

        let cost = distance_of(&distances, destination);
        if cost.is_infinite() {
            continue;
        }

        if let Some(next_hop) = find_next_hop(&previous, source, destination) {
            paths.insert(destination.clone(), ShortestPath { next_hop, cost });
        }
    }

    paths
}

fn distance_of(distances: &HashMap<NodeId, Cost>, router: &str) -> Cost {
    distances.get(router).copied().unwrap_or(Cost::INFINITY)
}

/// Walks predecessors back from `dest` until the hop right after `source`.
///
/// Stops early, with no next hop, on the first node whose predecessor is
/// unset, even when that node is not the source.
fn find_next_hop(previous: &HashMap<NodeId, Option<NodeId>>, source: &str, dest: &str) -> Option<NodeId> {
    let mut current = dest;
    loop {
        match previous.get(current) {
            Some(Some(prev)) if prev == source => return Some(current.to_string()),
            Some(Some(prev)) => current = prev,
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn graph(links: &[(&str, &str, Cost)]) -> TopologyGraph {
        let mut topology = TopologyGraph::new();
        for (a, b, cost) in links {
            topology.entry(a.to_string()).or_default().insert(b.to_string(), *cost);
            topology.entry(b.to_string()).or_default().insert(a.to_string(), *cost);
        }
        topology
    }

    fn diamond() -> TopologyGraph {
        graph(&[
            ("A", "B", 1.0),
            ("A", "C", 3.0),
            ("B", "C", 1.0),
            ("B", "D", 5.0),
            ("C", "D", 2.0),
        ])
    }

    /// Floyd-Warshall over the same graph, used as the reference answer.
    fn all_pairs(topology: &TopologyGraph) -> HashMap<(NodeId, NodeId), Cost> {
        let nodes: Vec<&NodeId> = topology.keys().collect();
        let mut dist = HashMap::new();
        for a in &nodes {
            for b in &nodes {
                let d = if a == b {
                    0.0
                } else {
                    topology[*a].get(*b).copied().unwrap_or(Cost::INFINITY)
                };
                dist.insert(((*a).clone(), (*b).clone()), d);
            }
        }
        for k in &nodes {
            for i in &nodes {
                for j in &nodes {
                    let via = dist[&((*i).clone(), (*k).clone())] + dist[&((*k).clone(), (*j).clone())];
                    let key = ((*i).clone(), (*j).clone());
                    if via < dist[&key] {
                        dist.insert(key, via);
                    }
                }
            }
        }
        dist
    }

    #[test]
    fn prefers_cheapest_multi_hop_path() {
        let paths = calculate_shortest_paths(&diamond(), "A");

        assert_eq!(paths["D"], ShortestPath { next_hop: "B".into(), cost: 4.0 });
        assert_eq!(paths["C"], ShortestPath { next_hop: "B".into(), cost: 2.0 });
        assert_eq!(paths["B"], ShortestPath { next_hop: "B".into(), cost: 1.0 });
    }

    #[test]
    fn source_is_never_a_destination() {
        let paths = calculate_shortest_paths(&diamond(), "C");
        assert!(!paths.contains_key("C"));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn disconnected_nodes_are_omitted() {
        let mut topology = diamond();
        topology.entry("X".into()).or_default().insert("Y".into(), 1.0);
        topology.entry("Y".into()).or_default().insert("X".into(), 1.0);

        let paths = calculate_shortest_paths(&topology, "A");
        assert!(!paths.contains_key("X"));
        assert!(!paths.contains_key("Y"));
        assert!(paths.contains_key("D"));
    }

    #[test]
    fn neighbor_without_own_entry_does_not_panic() {
        let mut topology = TopologyGraph::new();
        topology.entry("A".into()).or_default().insert("B".into(), 4.0);

        // B is only known as a neighbor, so it is never a destination key.
        let paths = calculate_shortest_paths(&topology, "A");
        assert!(paths.is_empty());

        topology.entry("B".into()).or_default();
        let paths = calculate_shortest_paths(&topology, "A");
        assert_eq!(paths["B"].cost, 4.0);
    }

    #[test]
    fn unknown_source_reaches_nothing() {
        let paths = calculate_shortest_paths(&diamond(), "Z");
        assert!(paths.is_empty());
    }

    #[test]
    fn repeated_runs_agree() {
        // A-B-D and A-C-D tie; either may win, but always the same one.
        let topology = graph(&[("A", "B", 1.0), ("A", "C", 1.0), ("B", "D", 1.0), ("C", "D", 1.0)]);

        let first = calculate_shortest_paths(&topology, "A");
        let second = calculate_shortest_paths(&topology.clone(), "A");

        assert_eq!(first, second);
        assert_eq!(first["D"].cost, 2.0);
        assert!(first["D"].next_hop == "B" || first["D"].next_hop == "C");
    }

    #[test]
    fn matches_floyd_warshall_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..50 {
            let size = rng.random_range(2..8);
            let names: Vec<String> = (0..size).map(|i| format!("n{i}")).collect();
            let mut topology = TopologyGraph::new();
            for name in &names {
                topology.entry(name.clone()).or_default();
            }
            for i in 0..size {
                for j in (i + 1)..size {
                    if rng.random_bool(0.4) {
                        let cost = rng.random_range(1..10) as Cost;
                        if let Some(n) = topology.get_mut(&names[i]) {
                            n.insert(names[j].clone(), cost);
                        }
                        if let Some(n) = topology.get_mut(&names[j]) {
                            n.insert(names[i].clone(), cost);
                        }
                    }
                }
            }

            let reference = all_pairs(&topology);
            for source in &names {
                let paths = calculate_shortest_paths(&topology, source);
                for dest in &names {
                    if dest == source {
                        continue;
                    }
                    let expected = reference[&(source.clone(), dest.clone())];
                    match paths.get(dest) {
                        Some(path) => {
                            assert_eq!(path.cost, expected, "{source} -> {dest}");
                            // the first hop must be a direct neighbor on an optimal path
                            let first_leg = topology[source][&path.next_hop];
                            let rest = if path.next_hop == *dest {
                                0.0
                            } else {
                                reference[&(path.next_hop.clone(), dest.clone())]
                            };
                            assert_eq!(first_leg + rest, expected);
                        }
                        None => assert!(expected.is_infinite(), "{source} -> {dest} missing"),
                    }
                }
            }
        }
    }
}
