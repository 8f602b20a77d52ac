//! Test utilities for usb-uevent-monitor
//!
//! Provides synthetic uevent payloads, a scripted [`MessageSource`] and
//! helpers for async tests.
//!
//! # Example
//!
//! ```
//! use common::test_utils::{ScriptedSource, usb_device_add};
//! use common::UeventStream;
//!
//! let source = ScriptedSource::new(vec![usb_device_add("/devices/usb1/1-1", "9/0/0")]);
//! let events: Vec<_> = UeventStream::new(source, 4096).usb_additions().collect();
//! assert_eq!(events.len(), 1);
//! ```

use crate::source::MessageSource;
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a raw uevent with the kernel's `action@devpath` header
///
/// # Arguments
/// * `action` - Uevent action (add, remove, bind, ...)
/// * `devpath` - Device path under `/sys`
/// * `pairs` - Remaining attributes, in wire order after ACTION and DEVPATH
pub fn create_mock_uevent(action: &str, devpath: &str, pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut raw = format!("{}@{}\0", action, devpath).into_bytes();
    raw.extend(protocol::encode(
        [("ACTION", action), ("DEVPATH", devpath)]
            .into_iter()
            .chain(pairs.iter().copied()),
    ));
    raw
}

/// Payload for a whole USB device being added
pub fn usb_device_add(devpath: &str, type_code: &str) -> Vec<u8> {
    create_mock_uevent(
        "add",
        devpath,
        &[
            ("SUBSYSTEM", "usb"),
            ("DEVTYPE", "usb_device"),
            ("PRODUCT", "46d/c52b/1211"),
            ("TYPE", type_code),
            ("BUSNUM", "001"),
            ("DEVNUM", "004"),
        ],
    )
}

/// Payload for a USB interface being added
pub fn usb_interface_add(devpath: &str, interface: &str) -> Vec<u8> {
    create_mock_uevent(
        "add",
        devpath,
        &[
            ("SUBSYSTEM", "usb"),
            ("DEVTYPE", "usb_interface"),
            ("PRODUCT", "46d/c52b/1211"),
            ("TYPE", "0/0/0"),
            ("INTERFACE", interface),
        ],
    )
}

/// A [`MessageSource`] that replays a fixed list of messages
///
/// Behaves like the kernel socket: each message is copied into the caller's
/// buffer and silently truncated if it does not fit.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    messages: VecDeque<Vec<u8>>,
    fail_at_end: bool,
}

impl ScriptedSource {
    pub fn new(messages: Vec<Vec<u8>>) -> Self {
        Self {
            messages: messages.into(),
            fail_at_end: false,
        }
    }

    /// Return a receive error instead of ending once the script runs out
    pub fn fail_after_script(&mut self) {
        self.fail_at_end = true;
    }

    /// Messages not yet delivered
    pub fn remaining(&self) -> usize {
        self.messages.len()
    }
}

impl MessageSource for ScriptedSource {
    fn recv(&mut self, buf: &mut [u8]) -> crate::Result<Option<usize>> {
        match self.messages.pop_front() {
            Some(msg) => {
                let len = msg.len().min(buf.len());
                buf[..len].copy_from_slice(&msg[..len]);
                Ok(Some(len))
            }
            None if self.fail_at_end => Err(crate::Error::Receive(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "scripted receive failure",
            ))),
            None => Ok(None),
        }
    }
}

/// Timeout wrapper for async tests
///
/// Wraps an async operation with a timeout to prevent tests from hanging.
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { duration })
}

/// Error returned when a test times out
#[derive(Debug)]
pub struct TimeoutError {
    /// The timeout duration that was exceeded
    pub duration: Duration,
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Test timed out after {:?}", self.duration)
    }
}

impl std::error::Error for TimeoutError {}
