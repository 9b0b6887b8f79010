#[path = "../common/mod.rs"]
mod common;

use std::thread;
use std::time::Duration;

use aclink::protocol::Frame;
use aclink::transport::MockDevice;
use aclink::{CommandType, DeviceBuilder, Error, MockTransport, ModuleId};
use serial_test::serial;

#[test]
#[serial]
fn builder_device_over_mock_transport() {
    common::init_logging();
    let mock = MockTransport::new();
    let link = mock.handle();
    let _sim = MockDevice::spawn(mock.handle(), common::echo_success);
    let device = DeviceBuilder::new().with_transport(mock).build().unwrap();

    let reply = device.contactless_card().send_command(b"poll").unwrap();
    assert_eq!(reply.payload, b"poll");

    let request = Frame::decode(&link.sent()[0]).unwrap();
    assert_eq!(request.module_id, ModuleId::ContactlessCard);
    assert_eq!(request.command_type, CommandType::Command);
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn write_failure_surfaces_and_link_recovers() {
    let mock = MockTransport::new();
    let link = mock.handle();
    let _sim = MockDevice::spawn(mock.handle(), common::echo_success);
    let device = DeviceBuilder::new().with_transport(mock).build().unwrap();

    link.fail_next_writes(1);
    let err = device.mifare().send_command(b"auth").unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(!device.is_closed());

    let reply = device.mifare().send_command(b"auth").unwrap();
    assert!(reply.is_success());
    assert_eq!(link.sent().len(), 1);
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn pending_frames_keep_exchange_open() {
    let config = aclink::LinkConfig::default().with_reply_timeout(Duration::from_millis(150));
    let (device, link) = common::mock_device(config).unwrap();

    let device_side = thread::spawn(move || {
        let request = Frame::decode(&link.next_sent(Duration::from_secs(1)).unwrap()).unwrap();
        thread::sleep(Duration::from_millis(100));
        link.push_reply(common::reply_frame(
            request.module_id,
            CommandType::Pending,
            request.sequence_id,
            b"",
        ));
        thread::sleep(Duration::from_millis(100));
        link.push_reply(common::reply_frame(
            request.module_id,
            CommandType::Success,
            request.sequence_id,
            b"done",
        ));
    });

    // 200ms in total, past the 150ms timeout the Pending frame extended.
    let reply = device.nxp_ntag().send_command(b"write").unwrap();
    assert_eq!(reply.payload, b"done");
    device_side.join().unwrap();
    device.shutdown().unwrap();
}
