//! Uevent Bridge Integration Tests
//!
//! Drives the receive stream on a blocking thread and consumes its output
//! through the async bridge, the way the monitor binary does.
//!
//! # Test Scenarios
//! - Scripted traffic mixing USB additions with unrelated uevents
//! - Receive errors ending the thread and closing the bridge
//! - Draining queued events after the thread exits
//!
//! Run with: `cargo test -p common --test uevent_bridge_tests`

use common::test_utils::{
    DEFAULT_TEST_TIMEOUT, ScriptedSource, create_mock_uevent, usb_device_add, usb_interface_add,
    with_timeout,
};
use common::{Error, UeventEvent, UeventStream, UeventWorker, create_uevent_bridge};
use protocol::{DeviceDetail, INTERFACE, TYPE};
use std::thread;

fn forward(source: ScriptedSource, worker: UeventWorker) -> thread::JoinHandle<common::Result<()>> {
    thread::spawn(move || {
        for attrs in UeventStream::new(source, 4096).usb_additions() {
            worker.send_event(UeventEvent::UsbAdded(attrs?))?;
        }
        Ok(())
    })
}

#[tokio::test]
async fn test_usb_additions_reach_async_side() {
    let (bridge, worker) = create_uevent_bridge();
    let source = ScriptedSource::new(vec![
        create_mock_uevent("add", "/devices/virtual/net/veth0", &[("SUBSYSTEM", "net")]),
        usb_device_add("/devices/usb1/1-3", "9/0/1"),
        usb_interface_add("/devices/usb1/1-3/1-3:1.0", "9/0/0"),
        create_mock_uevent(
            "bind",
            "/devices/usb1/1-3/1-3:1.0",
            &[("SUBSYSTEM", "usb"), ("DEVTYPE", "usb_interface")],
        ),
    ]);
    let handle = forward(source, worker);

    let UeventEvent::UsbAdded(device) = with_timeout(DEFAULT_TEST_TIMEOUT, bridge.recv_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(device.devpath, "/devices/usb1/1-3");
    assert_eq!(device.get(TYPE), Some("9/0/1"));

    let UeventEvent::UsbAdded(interface) = with_timeout(DEFAULT_TEST_TIMEOUT, bridge.recv_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(interface.get(INTERFACE), Some("9/0/0"));
    assert_eq!(interface.get(TYPE), None);

    // bind is not an addition, so the bridge closes next
    let closed = with_timeout(DEFAULT_TEST_TIMEOUT, bridge.recv_event())
        .await
        .unwrap();
    assert!(matches!(closed, Err(Error::Channel(_))));
    assert!(handle.join().unwrap().is_ok());
}

#[tokio::test]
async fn test_receive_error_is_returned_by_thread() {
    let (bridge, worker) = create_uevent_bridge();
    let mut source = ScriptedSource::new(vec![usb_device_add("/devices/usb2/2-1", "0/0/0")]);
    source.fail_after_script();
    let handle = forward(source, worker);

    // Events queued before the failure are still delivered
    let event = with_timeout(DEFAULT_TEST_TIMEOUT, bridge.recv_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        UeventEvent::UsbAdded(protocol::ReportableAttributes {
            devpath: "/devices/usb2/2-1".to_string(),
            detail: Some(DeviceDetail::Type("0/0/0".to_string())),
        })
    );

    assert!(bridge.recv_event().await.is_err());
    let result = handle.join().unwrap();
    assert!(matches!(result, Err(Error::Receive(_))));
}

#[test]
fn test_send_fails_without_bridge() {
    let (bridge, worker) = create_uevent_bridge();
    drop(bridge);

    let result = worker.send_event(UeventEvent::UsbAdded(protocol::ReportableAttributes {
        devpath: String::new(),
        detail: None,
    }));
    assert!(matches!(result, Err(Error::Channel(_))));
}
