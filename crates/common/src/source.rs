//! Uevent message sources and the receive stream
//!
//! The receive loop is an iterator over a [`MessageSource`]. The live source
//! is the kernel netlink socket; tests plug in a scripted source instead.

use protocol::{ReportableAttributes, Uevent};
use tracing::{debug, trace};

/// Something that yields one raw uevent datagram per call
pub trait MessageSource {
    /// Block until a message arrives and copy it into `buf`
    ///
    /// Returns the number of bytes written. A message longer than `buf` is
    /// truncated to `buf.len()`. `Ok(None)` means the source has no more
    /// messages; the kernel channel never returns it.
    fn recv(&mut self, buf: &mut [u8]) -> crate::Result<Option<usize>>;
}

impl<S: MessageSource + ?Sized> MessageSource for &mut S {
    fn recv(&mut self, buf: &mut [u8]) -> crate::Result<Option<usize>> {
        (**self).recv(buf)
    }
}

/// Lazy sequence of parsed uevents
///
/// Yields every message the source delivers. After the first error the stream
/// is exhausted; it is never restarted.
pub struct UeventStream<S> {
    source: S,
    buf: Vec<u8>,
    done: bool,
}

impl<S: MessageSource> UeventStream<S> {
    /// Create a stream reading at most `buffer_size` bytes per message
    pub fn new(source: S, buffer_size: usize) -> Self {
        Self {
            source,
            buf: vec![0; buffer_size],
            done: false,
        }
    }

    /// Receive buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.buf.len()
    }

    /// Narrow the stream to USB additions, yielding their reportable attributes
    pub fn usb_additions(self) -> impl Iterator<Item = crate::Result<ReportableAttributes>> {
        self.filter_map(|event| match event {
            Ok(event) => {
                let attrs = event.usb_addition();
                if attrs.is_none() {
                    trace!(
                        "Skipping uevent (usb={}, add={})",
                        event.classification.is_usb, event.classification.is_add
                    );
                }
                attrs.map(Ok)
            }
            Err(e) => Some(Err(e)),
        })
    }
}

impl<S: MessageSource> Iterator for UeventStream<S> {
    type Item = crate::Result<Uevent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.source.recv(&mut self.buf) {
            Ok(Some(len)) => {
                let raw = &self.buf[..len.min(self.buf.len())];
                debug!("Received uevent ({} bytes)", raw.len());
                Some(Ok(protocol::parse(raw)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
