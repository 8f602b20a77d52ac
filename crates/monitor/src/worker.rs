//! Uevent receive thread
//!
//! Dedicated thread that owns the uevent channel and runs the blocking
//! receive → decode → classify → extract loop. USB additions are forwarded to
//! the Tokio runtime through the uevent bridge.
//!
//! The thread ends when the channel fails or the bridge is dropped. A receive
//! error is returned through the join handle; the channel is never reopened.

use common::{MessageSource, UeventEvent, UeventStream, UeventWorker};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Run the receive loop until the source or the bridge fails
pub fn run_receive_loop<S: MessageSource>(
    source: S,
    buffer_size: usize,
    worker: UeventWorker,
) -> common::Result<()> {
    info!("Uevent receive thread started (buffer {} bytes)", buffer_size);

    for attrs in UeventStream::new(source, buffer_size).usb_additions() {
        let attrs = attrs.inspect_err(|e| error!("Uevent channel failed: {}", e))?;
        debug!("USB addition: {:?}", attrs);
        worker.send_event(UeventEvent::UsbAdded(attrs))?;
    }

    info!("Uevent source exhausted");
    Ok(())
}

/// Spawn the receive thread
///
/// The thread takes exclusive ownership of `source`.
pub fn spawn_uevent_worker<S>(
    source: S,
    buffer_size: usize,
    worker: UeventWorker,
) -> std::io::Result<JoinHandle<common::Result<()>>>
where
    S: MessageSource + Send + 'static,
{
    thread::Builder::new()
        .name("uevent-rx".to_string())
        .spawn(move || run_receive_loop(source, buffer_size, worker))
}
