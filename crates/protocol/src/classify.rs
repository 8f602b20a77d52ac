//! USB addition classification and attribute extraction

use crate::codec::FieldRecord;
use crate::types::{
    ClassificationResult, DEVPATH, DEVTYPE, DecodedEvent, DeviceDetail, INTERFACE,
    ReportableAttributes, TYPE,
};

const USB_SUBSYSTEM_PREFIX: &[u8] = b"SUBSYSTEM=usb";
const ADD_ACTION_PREFIX: &[u8] = b"ACTION=add";

/// Classify a message by its raw segments
///
/// Both checks are prefix matches on the segment, so `SUBSYSTEM=usbmon`
/// counts as USB.
pub fn classify(record: &FieldRecord<'_>) -> ClassificationResult {
    let mut result = ClassificationResult::default();
    for segment in record.segments() {
        if segment.starts_with(USB_SUBSYSTEM_PREFIX) {
            result.is_usb = true;
        }
        if segment.starts_with(ADD_ACTION_PREFIX) {
            result.is_add = true;
        }
    }
    result
}

/// Select the attributes to report for a USB addition
///
/// `usb_device` surfaces `TYPE`, `usb_interface` surfaces `INTERFACE`; any
/// other or missing `DEVTYPE` surfaces the device path alone.
pub fn extract(event: &DecodedEvent) -> ReportableAttributes {
    let detail = match event.get(DEVTYPE) {
        Some("usb_device") => Some(DeviceDetail::Type(event.value(TYPE).to_string())),
        Some("usb_interface") => Some(DeviceDetail::Interface(
            event.value(INTERFACE).to_string(),
        )),
        _ => None,
    };

    ReportableAttributes {
        devpath: event.value(DEVPATH).to_string(),
        detail,
    }
}

/// Attributes to report for a raw message, if it is a USB addition
pub fn usb_addition(raw: &[u8]) -> Option<ReportableAttributes> {
    crate::codec::parse(raw).usb_addition()
}
