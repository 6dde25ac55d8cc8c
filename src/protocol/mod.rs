pub mod lsdb;
pub mod messages;
pub mod routing_table;
pub mod schedule;
pub mod task_manager;

pub use lsdb::LinkStateDatabase;
pub use messages::Lsa;
pub use routing_table::{RoutingEntry, RoutingTable};
pub use schedule::{AdvertiseSchedule, FixedDelay, UniformJitter};

use log::{debug, info, trace};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::algorithms::calculate_shortest_paths;
use crate::network::Substrate;
use crate::{Cost, NeighborMap, NodeId};
use task_manager::Advertiser;

struct ProtocolState {
    running: bool,
    lsdb: LinkStateDatabase,
    advertiser: Option<Advertiser>,
}

/// Link-state engine of one router.
///
/// Everything that reads or writes the LSDB, the sequence table or the
/// routing table runs under the single `state` lock.
pub struct LinkStateProtocol {
    node_id: NodeId,
    state: Mutex<ProtocolState>,
    substrate: Weak<dyn Substrate>,
    routing_table: Arc<RwLock<RoutingTable>>,
    schedule: Arc<dyn AdvertiseSchedule>,
    stop_timeout: Duration,
}

impl LinkStateProtocol {
    pub fn new(
        node_id: NodeId,
        substrate: Weak<dyn Substrate>,
        routing_table: Arc<RwLock<RoutingTable>>,
        schedule: Arc<dyn AdvertiseSchedule>,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            node_id,
            state: Mutex::new(ProtocolState {
                running: false,
                lsdb: LinkStateDatabase::new(),
                advertiser: None,
            }),
            substrate,
            routing_table,
            schedule,
            stop_timeout,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn schedule(&self) -> &dyn AdvertiseSchedule {
        self.schedule.as_ref()
    }

    /// stopped -> running. Resets the LSDB to the local links, launches the
    /// periodic advertiser and advertises once. No-op when already running.
    pub async fn start(self: &Arc<Self>) -> bool {
        self.activate(true).await
    }

    /// Same as [`start`](Self::start) without the initial advertisement.
    /// Used to bring a whole network up before anyone floods.
    pub(crate) async fn start_silent(self: &Arc<Self>) -> bool {
        self.activate(false).await
    }

    async fn activate(self: &Arc<Self>, announce: bool) -> bool {
        let mut state = self.state.lock().await;
        if state.running {
            return false;
        }

        let neighbors = self.local_neighbors().await;
        info!("Starting link-state protocol on {} with {} neighbors", self.node_id, neighbors.len());

        state.lsdb = LinkStateDatabase::seeded(&self.node_id, neighbors);
        state.running = true;
        state.advertiser = Some(Advertiser::spawn(Arc::clone(self)));

        if announce {
            self.send_lsa(&state).await;
        }
        true
    }

    /// running -> stopped. Returns once the advertiser has exited or the
    /// stop timeout expired. The LSDB is left in place for inspection.
    pub async fn stop(&self) -> bool {
        let advertiser = {
            let mut state = self.state.lock().await;
            if !state.running {
                return false;
            }
            state.running = false;
            state.advertiser.take()
        };

        info!("Stopping link-state protocol on {}", self.node_id);
        if let Some(advertiser) = advertiser {
            advertiser.shutdown(&self.node_id, self.stop_timeout).await;
        }
        true
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    /// Applies a change on one of this node's own links, then floods the new
    /// LSA and recomputes routes. `cost` of [`crate::UNREACHABLE`] drops the
    /// neighbor.
    pub async fn update_link_state(&self, neighbor: &str, cost: Cost) {
        let mut state = self.state.lock().await;
        if !state.running {
            return;
        }

        let sequence = state.lsdb.apply_local_change(&self.node_id, neighbor, cost);
        debug!("{}: link to {} now {} (seq {})", self.node_id, neighbor, cost, sequence);

        self.send_lsa(&state).await;
        self.recompute_routes(&state).await;
    }

    /// Handles an LSA received from neighbor `source_id`.
    ///
    /// Anything not newer than the recorded sequence for its origin is
    /// dropped without forwarding. A fresh LSA is installed, forwarded
    /// unchanged to every neighbor except `source_id`, and triggers a route
    /// recomputation.
    pub async fn process_lsa(&self, source_id: &str, lsa: Lsa) {
        let mut state = self.state.lock().await;
        if !state.running {
            return;
        }

        if !state.lsdb.accept(&lsa) {
            trace!("{}: dropping stale LSA {}#{} from {}", self.node_id, lsa.origin, lsa.sequence, source_id);
            return;
        }
        debug!("{}: accepted LSA {}#{} from {}", self.node_id, lsa.origin, lsa.sequence, source_id);

        if let Some(substrate) = self.substrate.upgrade() {
            let neighbors = substrate.neighbors(&self.node_id).await;
            for neighbor in neighbors.keys().filter(|n| n.as_str() != source_id) {
                substrate.deliver(&self.node_id, neighbor, lsa.clone()).await;
            }
        }

        self.recompute_routes(&state).await;
    }

    pub async fn advertise(&self) {
        let state = self.state.lock().await;
        self.send_lsa(&state).await;
    }

    /// One periodic refresh. Returns false once the task should exit.
    pub(crate) async fn refresh(&self) -> bool {
        let state = self.state.lock().await;
        if !state.running || self.substrate.strong_count() == 0 {
            return false;
        }
        self.send_lsa(&state).await;
        true
    }

    pub async fn lsdb(&self) -> LinkStateDatabase {
        self.state.lock().await.lsdb.clone()
    }

    pub async fn sequence_of(&self, node: &str) -> u64 {
        self.state.lock().await.lsdb.sequence_of(node)
    }

    async fn local_neighbors(&self) -> NeighborMap {
        match self.substrate.upgrade() {
            Some(substrate) => substrate.neighbors(&self.node_id).await,
            None => NeighborMap::new(),
        }
    }

    async fn send_lsa(&self, state: &ProtocolState) {
        if !state.running {
            return;
        }
        let Some(substrate) = self.substrate.upgrade() else {
            return;
        };

        let neighbors = substrate.neighbors(&self.node_id).await;
        if neighbors.is_empty() {
            return;
        }

        // Owned copy: later local changes must not show through.
        let lsa = state.lsdb.own_lsa(&self.node_id);
        debug!("{}: advertising seq {} to {} neighbors", self.node_id, lsa.sequence, neighbors.len());

        for neighbor in neighbors.keys() {
            substrate.deliver(&self.node_id, neighbor, lsa.clone()).await;
        }
    }

    async fn recompute_routes(&self, state: &ProtocolState) {
        let topology = state.lsdb.to_topology();
        let table = RoutingTable::from_paths(calculate_shortest_paths(&topology, &self.node_id));

        debug!("{}: recomputed {} routes from {} LSDB entries", self.node_id, table.len(), state.lsdb.len());
        *self.routing_table.write().await = table;
    }
}
