use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{RwLock, mpsc};

use crate::config::SimulationConfig;
use crate::network::{FloodTicket, Substrate};
use crate::protocol::{AdvertiseSchedule, LinkStateDatabase, LinkStateProtocol, Lsa, RoutingTable};
use crate::{Cost, NodeId};

#[derive(Debug)]
struct Envelope {
    from: NodeId,
    lsa: Lsa,
    ticket: FloodTicket,
}

/// One simulated node wrapped around its link-state protocol.
pub struct Router {
    pub id: NodeId,
    started: AtomicBool,
    protocol: Arc<LinkStateProtocol>,
    routing_table: Arc<RwLock<RoutingTable>>,
    inbox: mpsc::UnboundedSender<Envelope>,
}

impl Router {
    /// Creates the router and spawns its inbox pump, so this must run inside
    /// a tokio runtime. The pump ends when the router is dropped.
    pub fn new(
        id: NodeId,
        substrate: Weak<dyn Substrate>,
        schedule: Arc<dyn AdvertiseSchedule>,
        config: &SimulationConfig,
    ) -> Self {
        let routing_table = Arc::new(RwLock::new(RoutingTable::new()));
        let protocol = Arc::new(LinkStateProtocol::new(
            id.clone(),
            substrate,
            routing_table.clone(),
            schedule,
            config.stop_timeout(),
        ));

        let (inbox, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(rx, protocol.clone()));

        Self {
            id,
            started: AtomicBool::new(false),
            protocol,
            routing_table,
            inbox,
        }
    }

    pub async fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
        self.protocol.start().await;
    }

    pub(crate) async fn start_silent(&self) {
        self.started.store(true, Ordering::SeqCst);
        self.protocol.start_silent().await;
    }

    pub async fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
        self.protocol.stop().await;
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub async fn is_running(&self) -> bool {
        self.protocol.is_running().await
    }

    /// Called by the network when one of this router's links changed.
    /// Ignored entirely until [`start`](Self::start) has been called.
    pub async fn notify_link_change(&self, neighbor: &str, cost: Cost) {
        if !self.is_started() {
            debug!("{}: ignoring link change to {} while stopped", self.id, neighbor);
            return;
        }
        self.protocol.update_link_state(neighbor, cost).await;
    }

    pub async fn receive_lsa(&self, source_id: &str, lsa: Lsa) {
        self.protocol.process_lsa(source_id, lsa).await;
    }

    // Unbounded: the ticket is held until the pump has processed the LSA.
    pub(crate) fn post(&self, from: &str, lsa: Lsa, ticket: FloodTicket) -> bool {
        let envelope = Envelope {
            from: from.to_string(),
            lsa,
            ticket,
        };
        self.inbox.send(envelope).is_ok()
    }

    pub async fn advertise(&self) {
        self.protocol.advertise().await;
    }

    pub async fn get_routing_table(&self) -> RoutingTable {
        self.routing_table.read().await.clone()
    }

    /// Next hop towards `destination`, or `None` when it is unreachable.
    pub async fn forward_packet(&self, destination: &str) -> Option<NodeId> {
        self.routing_table.read().await.next_hop(destination).cloned()
    }

    pub async fn lsdb(&self) -> LinkStateDatabase {
        self.protocol.lsdb().await
    }

    pub async fn sequence_of(&self, node: &str) -> u64 {
        self.protocol.sequence_of(node).await
    }
}

async fn pump(mut rx: mpsc::UnboundedReceiver<Envelope>, protocol: Arc<LinkStateProtocol>) {
    while let Some(Envelope { from, lsa, ticket }) = rx.recv().await {
        protocol.process_lsa(&from, lsa).await;
        // released only once anything this LSA triggered is queued
        drop(ticket);
    }
    info!("Inbox of {} closed", protocol.node_id());
}
