//! Async channel bridge between Tokio runtime and the uevent receive thread

use async_channel::{Receiver, Sender, bounded};
use protocol::ReportableAttributes;

/// Events from the receive thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UeventEvent {
    /// A USB device or interface was added
    UsbAdded(ReportableAttributes),
}

/// Handle for Tokio runtime (async)
#[derive(Clone)]
pub struct UeventBridge {
    event_rx: Receiver<UeventEvent>,
}

impl UeventBridge {
    /// Receive an event from the receive thread
    ///
    /// Fails with [`crate::Error::Channel`] once the thread has exited and
    /// every queued event has been drained.
    pub async fn recv_event(&self) -> crate::Result<UeventEvent> {
        self.event_rx
            .recv()
            .await
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Handle for the receive thread (blocking)
pub struct UeventWorker {
    event_tx: Sender<UeventEvent>,
}

impl UeventWorker {
    /// Send an event to Tokio runtime (blocking)
    pub fn send_event(&self, event: UeventEvent) -> crate::Result<()> {
        self.event_tx
            .send_blocking(event)
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Create the channel bridge between Tokio and the receive thread
///
/// Returns (UeventBridge for Tokio, UeventWorker for the receive thread)
pub fn create_uevent_bridge() -> (UeventBridge, UeventWorker) {
    let (event_tx, event_rx) = bounded(256);

    (UeventBridge { event_rx }, UeventWorker { event_tx })
}
