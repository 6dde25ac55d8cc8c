pub mod delivery;
pub mod persist;
pub mod substrate;
pub mod topology;

pub use delivery::{FloodTicket, FloodTracker};
pub use persist::{LinkRecord, TopologyFile};
pub use substrate::Substrate;
pub use topology::LinkTable;

use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock};

use crate::config::SimulationConfig;
use crate::error::PersistError;
use crate::protocol::{AdvertiseSchedule, Lsa};
use crate::router::Router;
use crate::{Cost, NeighborMap, NodeId, UNREACHABLE};

#[derive(Default)]
struct Topology {
    routers: BTreeMap<NodeId, Arc<Router>>,
    links: LinkTable,
}

/// The simulated network: which routers exist, how they are linked, and the
/// fabric that carries LSAs between them.
///
/// Structural edits run one at a time, including the link-change
/// notifications they send. Neighbor lookups and deliveries only take the
/// shared side of the topology lock.
pub struct Network {
    me: Weak<Network>,
    topology: RwLock<Topology>,
    edits: Mutex<()>,
    flood: Arc<FloodTracker>,
    config: SimulationConfig,
    schedule: Arc<dyn AdvertiseSchedule>,
}

impl Network {
    pub fn new() -> Arc<Self> {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Arc<Self> {
        let schedule = Arc::new(config.schedule());
        Self::with_schedule(config, schedule)
    }

    /// Network whose routers all use `schedule` unless given their own.
    pub fn with_schedule(config: SimulationConfig, schedule: Arc<dyn AdvertiseSchedule>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            topology: RwLock::new(Topology::default()),
            edits: Mutex::new(()),
            flood: FloodTracker::new(),
            config,
            schedule,
        })
    }

    fn new_router(&self, id: &str, schedule: Arc<dyn AdvertiseSchedule>) -> Arc<Router> {
        let substrate: Weak<dyn Substrate> = self.me.clone();
        Arc::new(Router::new(id.to_string(), substrate, schedule, &self.config))
    }

    /// Creates router `id`. False if it already exists.
    pub async fn add_node(&self, id: impl Into<NodeId>) -> bool {
        self.add_node_with_schedule(id, self.schedule.clone()).await
    }

    pub async fn add_node_with_schedule(&self, id: impl Into<NodeId>, schedule: Arc<dyn AdvertiseSchedule>) -> bool {
        let id = id.into();
        let _edits = self.edits.lock().await;
        let mut topology = self.topology.write().await;

        if topology.routers.contains_key(&id) {
            return false;
        }
        let router = self.new_router(&id, schedule);
        topology.routers.insert(id.clone(), router);
        debug!("Added node {}", id);
        true
    }

    /// Links `a` and `b` at `cost`. False unless both nodes exist, they are
    /// distinct and the cost is positive and finite. Linking an already
    /// linked pair changes its cost.
    pub async fn add_link(&self, a: &str, b: &str, cost: Cost) -> bool {
        if a == b || !persist::is_valid_cost(cost) {
            return false;
        }

        let _edits = self.edits.lock().await;
        let endpoints = {
            let mut topology = self.topology.write().await;
            let (Some(ra), Some(rb)) = (topology.routers.get(a).cloned(), topology.routers.get(b).cloned()) else {
                return false;
            };
            topology.links.insert(a, b, cost);
            (ra, rb)
        };

        debug!("Link {} - {} set to {}", a, b, cost);
        Self::notify_endpoints(endpoints, a, b, cost).await;
        true
    }

    pub async fn update_link_cost(&self, a: &str, b: &str, cost: Cost) -> bool {
        if !persist::is_valid_cost(cost) {
            return false;
        }

        let _edits = self.edits.lock().await;
        let endpoints = {
            let mut topology = self.topology.write().await;
            let Some(endpoints) = topology.endpoints(a, b) else {
                return false;
            };
            if !topology.links.update(a, b, cost) {
                return false;
            }
            endpoints
        };

        debug!("Link {} - {} cost changed to {}", a, b, cost);
        Self::notify_endpoints(endpoints, a, b, cost).await;
        true
    }

    /// Deletes a link and signals both endpoints that the other side is
    /// now unreachable.
    pub async fn remove_link(&self, a: &str, b: &str) -> bool {
        let _edits = self.edits.lock().await;
        let endpoints = {
            let mut topology = self.topology.write().await;
            let Some(endpoints) = topology.endpoints(a, b) else {
                return false;
            };
            if !topology.links.remove(a, b) {
                return false;
            }
            endpoints
        };

        debug!("Link {} - {} removed", a, b);
        Self::notify_endpoints(endpoints, a, b, UNREACHABLE).await;
        true
    }

    async fn notify_endpoints((ra, rb): (Arc<Router>, Arc<Router>), a: &str, b: &str, cost: Cost) {
        ra.notify_link_change(b, cost).await;
        rb.notify_link_change(a, cost).await;
    }

    pub async fn get_neighbors(&self, id: &str) -> NeighborMap {
        self.topology.read().await.links.neighbors(id)
    }

    pub async fn link_cost(&self, a: &str, b: &str) -> Option<Cost> {
        self.topology.read().await.links.cost(a, b)
    }

    pub async fn nodes(&self) -> Vec<NodeId> {
        self.topology.read().await.routers.keys().cloned().collect()
    }

    pub async fn links(&self) -> Vec<(NodeId, NodeId, Cost)> {
        self.topology.read().await.links.undirected()
    }

    pub async fn router(&self, id: &str) -> Option<Arc<Router>> {
        self.topology.read().await.routers.get(id).cloned()
    }

    pub async fn routers(&self) -> Vec<Arc<Router>> {
        self.topology.read().await.routers.values().cloned().collect()
    }

    /// Starts every router. All protocols are running before the first
    /// advertisement goes out, so no initial LSA lands on a stopped router.
    pub async fn start_all(&self) {
        let routers = self.routers().await;
        info!("Starting {} routers", routers.len());

        for router in &routers {
            router.start_silent().await;
        }
        for router in &routers {
            router.advertise().await;
        }
    }

    pub async fn stop_all(&self) {
        let routers = self.routers().await;
        info!("Stopping {} routers", routers.len());

        for router in &routers {
            router.stop().await;
        }
    }

    /// Waits until every LSA posted so far, and everything it triggered,
    /// has been processed.
    pub async fn settle(&self) {
        self.flood.wait_idle().await;
    }

    pub fn in_flight(&self) -> usize {
        self.flood.in_flight()
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let file = {
            let topology = self.topology.read().await;
            TopologyFile {
                nodes: topology.routers.keys().cloned().collect(),
                links: topology
                    .links
                    .undirected()
                    .into_iter()
                    .map(|(source, target, cost)| LinkRecord { source, target, cost })
                    .collect(),
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, file.to_json()?).await?;
        info!("Saved topology ({} nodes, {} links) to {}", file.nodes.len(), file.links.len(), path.display());
        Ok(())
    }

    /// Replaces the whole topology with the contents of `path`.
    ///
    /// The file is read and validated first; on any error the current
    /// topology is left exactly as it was. Routers of the replaced topology
    /// are stopped.
    pub async fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let file = TopologyFile::parse(&text)?;

        let _edits = self.edits.lock().await;
        let replaced = {
            let mut topology = self.topology.write().await;
            let replaced = std::mem::take(&mut topology.routers);
            topology.links.clear();

            for id in &file.nodes {
                if !topology.routers.contains_key(id) {
                    let router = self.new_router(id, self.schedule.clone());
                    topology.routers.insert(id.clone(), router);
                }
            }
            for link in &file.links {
                topology.links.insert(&link.source, &link.target, link.cost);
            }
            replaced
        };

        for router in replaced.values() {
            router.stop().await;
        }

        info!("Loaded topology ({} nodes, {} links) from {}", file.nodes.len(), file.links.len(), path.display());
        Ok(())
    }
}

impl Topology {
    fn endpoints(&self, a: &str, b: &str) -> Option<(Arc<Router>, Arc<Router>)> {
        Some((self.routers.get(a)?.clone(), self.routers.get(b)?.clone()))
    }
}

#[async_trait]
impl Substrate for Network {
    async fn neighbors(&self, node: &str) -> NeighborMap {
        self.get_neighbors(node).await
    }

    async fn deliver(&self, from: &str, to: &str, lsa: Lsa) {
        let Some(router) = self.router(to).await else {
            return;
        };
        router.post(from, lsa, self.flood.ticket());
    }
}
