#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use link_state_sim::protocol::FixedDelay;
use link_state_sim::{Cost, Network, NodeId, SimulationConfig};

/// Refresh interval long enough that no periodic advertisement fires
/// during a test.
pub const QUIET: Duration = Duration::from_secs(3600);

pub fn quiet_network() -> Arc<Network> {
    Network::with_schedule(SimulationConfig::default(), Arc::new(FixedDelay(QUIET)))
}

/// Network whose routers re-advertise every `every`.
pub fn refreshing_network(every: Duration) -> Arc<Network> {
    Network::with_schedule(SimulationConfig::default(), Arc::new(FixedDelay(every)))
}

pub async fn build(network: &Arc<Network>, nodes: &[&str], links: &[(&str, &str, Cost)]) {
    for node in nodes {
        assert!(network.add_node(*node).await, "duplicate node {node}");
    }
    for (a, b, cost) in links {
        assert!(network.add_link(a, b, *cost).await, "bad link {a}-{b}");
    }
}

pub const DIAMOND_NODES: &[&str] = &["A", "B", "C", "D"];

/// A-B(1), A-C(3), B-C(1), B-D(5), C-D(2)
pub const DIAMOND_LINKS: &[(&str, &str, Cost)] = &[
    ("A", "B", 1.0),
    ("A", "C", 3.0),
    ("B", "C", 1.0),
    ("B", "D", 5.0),
    ("C", "D", 2.0),
];

pub async fn diamond() -> Arc<Network> {
    let network = quiet_network();
    build(&network, DIAMOND_NODES, DIAMOND_LINKS).await;
    network
}

/// 1-2(2), 1-3(1), 2-3(4), 2-4(5), 3-4(100), 3-5(8), 4-5(1)
pub async fn weighted_five() -> Arc<Network> {
    let network = quiet_network();
    build(
        &network,
        &["1", "2", "3", "4", "5"],
        &[
            ("1", "2", 2.0),
            ("1", "3", 1.0),
            ("2", "3", 4.0),
            ("2", "4", 5.0),
            ("3", "4", 100.0),
            ("3", "5", 8.0),
            ("4", "5", 1.0),
        ],
    )
    .await;
    network
}

/// A-B-C-D chain, unit costs.
pub async fn chain() -> Arc<Network> {
    let network = quiet_network();
    build(
        &network,
        &["A", "B", "C", "D"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)],
    )
    .await;
    network
}

pub async fn converge(network: &Arc<Network>) {
    network.start_all().await;
    settle(network).await;
}

pub async fn settle(network: &Arc<Network>) {
    tokio::time::timeout(Duration::from_secs(5), network.settle())
        .await
        .expect("flooding did not settle");
}

/// All-pairs shortest costs of the substrate's current links.
pub async fn oracle(network: &Network) -> HashMap<(NodeId, NodeId), Cost> {
    let nodes = network.nodes().await;
    let mut dist = HashMap::new();
    for a in &nodes {
        for b in &nodes {
            dist.insert((a.clone(), b.clone()), if a == b { 0.0 } else { Cost::INFINITY });
        }
    }
    for (a, b, cost) in network.links().await {
        dist.insert((a.clone(), b.clone()), cost);
        dist.insert((b, a), cost);
    }
    for k in &nodes {
        for i in &nodes {
            for j in &nodes {
                let via = dist[&(i.clone(), k.clone())] + dist[&(k.clone(), j.clone())];
                if via < dist[&(i.clone(), j.clone())] {
                    dist.insert((i.clone(), j.clone()), via);
                }
            }
        }
    }
    dist
}

fn close(a: Cost, b: Cost) -> bool {
    (a - b).abs() < 1e-9
}

/// Every router routes every reachable destination at the optimal cost
/// through a neighbor that lies on an optimal path, and has no entry for
/// unreachable ones.
pub async fn assert_converged(network: &Network) {
    let best = oracle(network).await;

    for router in network.routers().await {
        let src = router.id.clone();
        let table = router.get_routing_table().await;
        assert!(!table.contains(&src), "{src} routes to itself");

        for dst in network.nodes().await.into_iter().filter(|d| *d != src) {
            let expected = best[&(src.clone(), dst.clone())];
            let entry = table.get_route(&dst);

            if expected.is_infinite() {
                assert!(entry.is_none(), "{src} still routes to unreachable {dst}");
                continue;
            }

            let entry = entry.unwrap_or_else(|| panic!("{src} has no route to {dst}"));
            assert!(close(entry.distance, expected), "{src}->{dst}: {} != {}", entry.distance, expected);

            let first_leg = network
                .link_cost(&src, &entry.next_hop)
                .await
                .unwrap_or_else(|| panic!("{src}->{dst}: next hop {} is not a neighbor", entry.next_hop));
            let rest = best[&(entry.next_hop.clone(), dst.clone())];
            assert!(close(first_leg + rest, expected), "{src}->{dst}: next hop {} is off the shortest path", entry.next_hop);
        }
    }
}

pub async fn destinations(network: &Network, node: &str) -> BTreeSet<NodeId> {
    let router = network.router(node).await.expect("unknown router");
    router.get_routing_table().await.iter().map(|(d, _)| d.clone()).collect()
}
