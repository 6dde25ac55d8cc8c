pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod router;

use std::collections::BTreeMap;

pub use config::SimulationConfig;
pub use error::{ConfigError, PersistError};
pub use network::Network;
pub use protocol::{Lsa, LinkStateProtocol, RoutingTable};
pub use router::Router;

pub type NodeId = String;

/// Scalar link cost. Always positive and finite for a live link.
pub type Cost = f64;

/// Cost signalled to a router when one of its links goes away.
pub const UNREACHABLE: Cost = f64::INFINITY;

/// Directly connected neighbors of one node and the cost to reach each.
///
/// Ordered so that graph walks over the same topology visit edges in the
/// same order every time.
pub type NeighborMap = BTreeMap<NodeId, Cost>;
