#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use aclink::protocol::Frame;
use aclink::{CommandType, Error, LinkConfig, ModuleId};
use serial_test::serial;

use common::reply_frame;

/// Answers the first request correctly, the second with the wrong sequence
/// id and the third with a corrupted checksum.
fn scripted_responder() -> impl FnMut(&Frame) -> Vec<Vec<u8>> + Send + 'static {
    let calls = Arc::new(AtomicUsize::new(0));
    move |req: &Frame| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        match n {
            0 => vec![reply_frame(
                req.module_id,
                CommandType::Success,
                req.sequence_id,
                b"ok",
            )],
            1 => vec![reply_frame(
                req.module_id,
                CommandType::Success,
                req.sequence_id.next(),
                b"ok",
            )],
            _ => {
                let mut bytes =
                    reply_frame(req.module_id, CommandType::Success, req.sequence_id, b"ok");
                if let Some(last) = bytes.last_mut() {
                    *last ^= 0xff;
                }
                vec![bytes]
            }
        }
    }
}

#[test]
#[serial]
fn led_command_success_then_protocol_errors() {
    common::init_logging();
    let config = LinkConfig::default()
        .with_reply_timeout(std::time::Duration::from_millis(500))
        .with_initial_sequence(7);
    let (device, _sim, link) = common::simulated_device(config, scripted_responder()).unwrap();
    let service = device.service_operations();

    let reply = service.send_command(common::fixtures::led_payload()).unwrap();
    assert!(reply.is_success());
    assert_eq!(reply.payload, b"ok");

    match service.send_command(common::fixtures::led_payload()) {
        Err(Error::OutOfOrder { expected, actual }) => {
            assert_eq!(actual, expected.next());
        }
        other => panic!("expected out of order, got {:?}", other),
    }

    match service.send_command(common::fixtures::led_payload()) {
        Err(Error::ChecksumError { cause }) => {
            assert!(matches!(*cause, Error::ChecksumMismatch { .. }));
        }
        other => panic!("expected checksum error, got {:?}", other),
    }

    let sent = link.sent();
    assert_eq!(sent.len(), 3);
    for (i, bytes) in sent.iter().enumerate() {
        let frame = Frame::decode(bytes).unwrap();
        assert_eq!(frame.module_id, ModuleId::ServiceOperations);
        assert_eq!(frame.command_type, CommandType::Command);
        assert_eq!(frame.sequence_id.as_u8() as usize, 7 + i);
    }

    let stats = device.stats();
    assert_eq!(stats.frames_sent, 3);
    assert_eq!(stats.out_of_order, 1);
    assert_eq!(stats.checksum_errors, 1);
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn failure_reply_is_a_reply_not_an_error() {
    let (device, _sim, _link) = common::simulated_device(LinkConfig::default(), |req| {
        vec![reply_frame(
            req.module_id,
            CommandType::Failure,
            req.sequence_id,
            b"no card",
        )]
    })
    .unwrap();

    let reply = device.contactless_card().send_command(b"poll").unwrap();
    assert!(reply.is_failure());
    assert_eq!(reply.payload_str(), Some("no card"));
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn link_closed_by_device_fails_the_exchange() {
    let (device, link) = common::mock_device(LinkConfig::default()).unwrap();
    let closer = std::thread::spawn(move || {
        let _ = link.next_sent(std::time::Duration::from_secs(1));
        link.close();
    });

    let err = device.mifare().send_command(b"auth").unwrap_err();
    assert!(matches!(err, Error::LinkClosed));
    closer.join().unwrap();

    let err = device.mifare().send_command(b"auth").unwrap_err();
    assert!(matches!(err, Error::LinkClosed));
    assert!(device.is_closed());
}
