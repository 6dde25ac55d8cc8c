use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::LinkStateProtocol;

#[derive(Debug)]
pub struct Advertiser {
    handle: JoinHandle<()>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Advertiser {
    pub fn spawn(protocol: Arc<LinkStateProtocol>) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            advertise_task(protocol, shutdown_rx).await;
        });

        Self { handle, shutdown_tx }
    }

    /// Signals the task and waits up to `timeout` for it to exit, aborting
    /// it if it is still alive after that.
    pub async fn shutdown(self, node_id: &str, timeout: Duration) {
        let _ = self.shutdown_tx.send(());

        let mut handle = self.handle;
        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(_) => debug!("Advertiser for {} stopped", node_id),
            Err(_) => {
                warn!("Advertiser for {} did not stop within {:?}, aborting", node_id, timeout);
                handle.abort();
            }
        }
    }
}

async fn advertise_task(protocol: Arc<LinkStateProtocol>, mut shutdown_rx: broadcast::Receiver<()>) {
    loop {
        let delay = protocol.schedule().next_delay();

        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Advertiser for {} shutting down", protocol.node_id());
                break;
            }
            _ = tokio::time::sleep(delay) => {
                if !protocol.refresh().await {
                    break;
                }
            }
        }
    }
}
