pub mod dijkstra;

pub use dijkstra::{TopologyGraph, ShortestPath, calculate_shortest_paths};
