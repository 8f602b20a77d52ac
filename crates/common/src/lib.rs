//! Common utilities for usb-uevent-monitor
//!
//! This crate provides the pieces shared by the monitor binary and its tests:
//! error handling, logging setup, the receive stream over a message source,
//! and the async channel bridge for the receive thread.

pub mod channel;
pub mod error;
pub mod logging;
pub mod source;
pub mod test_utils;

pub use channel::{UeventBridge, UeventEvent, UeventWorker, create_uevent_bridge};
pub use error::{Error, Result};
pub use logging::setup_logging;
pub use source::{MessageSource, UeventStream};
