//! Kernel uevent protocol for usb-uevent-monitor
//!
//! This crate decodes the datagrams the kernel broadcasts on its
//! `NETLINK_KOBJECT_UEVENT` channel, classifies them, and extracts the
//! attributes worth reporting for USB device additions. Everything here is
//! pure: no I/O and no failure modes.
//!
//! # Example
//!
//! ```
//! use protocol::{DeviceDetail, usb_addition};
//!
//! let raw = b"add@/devices/usb1/1-1\0ACTION=add\0SUBSYSTEM=usb\0\
//!             DEVPATH=/devices/usb1/1-1\0DEVTYPE=usb_device\0TYPE=9/0/0\0";
//!
//! let attrs = usb_addition(raw).unwrap();
//! assert_eq!(attrs.devpath, "/devices/usb1/1-1");
//! assert_eq!(attrs.detail, Some(DeviceDetail::Type("9/0/0".to_string())));
//! ```
//!
//! # Decoding Only
//!
//! ```
//! use protocol::decode;
//!
//! let event = decode(b"ACTION=remove\0SUBSYSTEM=block\0");
//! assert_eq!(event.get("SUBSYSTEM"), Some("block"));
//! ```

pub mod classify;
pub mod codec;
pub mod types;

pub use classify::{classify, extract, usb_addition};
pub use codec::{DEFAULT_BUFFER_SIZE, FieldRecord, UEVENT_GROUP, decode, encode, parse};
pub use types::{
    ClassificationResult, DEVPATH, DEVTYPE, DecodedEvent, DeviceDetail, INTERFACE,
    ReportableAttributes, TYPE, Uevent,
};
