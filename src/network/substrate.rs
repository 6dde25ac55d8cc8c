use async_trait::async_trait;

use crate::NeighborMap;
use crate::protocol::Lsa;

/// What a router's protocol needs from the network it is attached to.
///
/// [`crate::Network`] is the in-process implementation. A socket or RPC
/// transport would implement this trait without the protocol changing.
#[async_trait]
pub trait Substrate: Send + Sync {
    async fn neighbors(&self, node: &str) -> NeighborMap;

    /// Hands `lsa` to router `to`. Unknown targets are dropped silently.
    async fn deliver(&self, from: &str, to: &str, lsa: Lsa);
}
