//! Uevent type definitions
//!
//! This module defines the decoded form of a kernel uevent, the result of
//! classifying it, and the subset of attributes surfaced for USB additions.

use serde::Serialize;
use std::collections::HashMap;

/// Attribute carrying the device location under `/sys`
pub const DEVPATH: &str = "DEVPATH";
/// Attribute naming the device shape (`usb_device`, `usb_interface`, ...)
pub const DEVTYPE: &str = "DEVTYPE";
/// Attribute carrying the `class/subclass/protocol` code of a whole device
pub const TYPE: &str = "TYPE";
/// Attribute carrying the `class/subclass/protocol` code of an interface
pub const INTERFACE: &str = "INTERFACE";

/// Key/value attributes of one uevent
///
/// Built from the `KEY=VALUE` segments of a raw message. Keys are unique;
/// when the message repeats a key, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedEvent {
    fields: HashMap<String, String>,
}

impl DecodedEvent {
    pub(crate) fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }

    /// Look up an attribute value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Look up an attribute value, yielding `""` when absent
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Number of distinct attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all attributes in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Two independent facts about a uevent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Some segment starts with `SUBSYSTEM=usb`
    pub is_usb: bool,
    /// Some segment starts with `ACTION=add`
    pub is_add: bool,
}

impl ClassificationResult {
    /// Whether the event should be reported as a USB addition
    pub fn is_reportable(&self) -> bool {
        self.is_usb && self.is_add
    }
}

/// Shape-dependent detail of a USB addition
///
/// Only whole devices and interfaces are recognised. Any other `DEVTYPE`
/// carries no detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceDetail {
    /// `DEVTYPE=usb_device`: the `TYPE` code
    Type(String),
    /// `DEVTYPE=usb_interface`: the `INTERFACE` code
    Interface(String),
}

/// Attributes surfaced for one USB addition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportableAttributes {
    /// `DEVPATH`, empty when the message carried none
    pub devpath: String,
    #[serde(flatten)]
    pub detail: Option<DeviceDetail>,
}

impl ReportableAttributes {
    /// Look up a surfaced attribute by its uevent name
    pub fn get(&self, key: &str) -> Option<&str> {
        match (key, &self.detail) {
            (DEVPATH, _) => Some(self.devpath.as_str()),
            (TYPE, Some(DeviceDetail::Type(t))) => Some(t.as_str()),
            (INTERFACE, Some(DeviceDetail::Interface(i))) => Some(i.as_str()),
            _ => None,
        }
    }

    /// Surfaced attributes as `(name, value)` pairs, device path first
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![(DEVPATH, self.devpath.as_str())];
        match &self.detail {
            Some(DeviceDetail::Type(t)) => fields.push((TYPE, t.as_str())),
            Some(DeviceDetail::Interface(i)) => fields.push((INTERFACE, i.as_str())),
            None => {}
        }
        fields
    }
}

/// A fully parsed uevent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uevent {
    pub classification: ClassificationResult,
    pub fields: DecodedEvent,
}

impl Uevent {
    /// Attributes to report, if this is a USB addition
    pub fn usb_addition(&self) -> Option<ReportableAttributes> {
        self.classification
            .is_reportable()
            .then(|| crate::classify::extract(&self.fields))
    }
}
