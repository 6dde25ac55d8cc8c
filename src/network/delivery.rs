use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts LSAs posted to some router inbox and not yet fully processed.
#[derive(Debug, Default)]
pub struct FloodTracker {
    in_flight: AtomicUsize,
    idle: Notify,
}

impl FloodTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ticket(self: &Arc<Self>) -> FloodTicket {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        FloodTicket {
            tracker: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Resolves once nothing is in flight.
    ///
    /// A message only releases its ticket after the receiver has posted
    /// whatever it forwards, so an idle tracker means the flood is over.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug)]
pub struct FloodTicket {
    tracker: Arc<FloodTracker>,
}

impl Drop for FloodTicket {
    fn drop(&mut self) {
        if self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}
