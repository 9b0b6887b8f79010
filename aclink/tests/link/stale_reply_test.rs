#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use aclink::{CommandType, Error, LinkConfig};
use serial_test::serial;

use common::reply_frame;

#[test]
#[serial]
fn late_reply_to_timed_out_exchange_is_dropped() {
    common::init_logging();
    let config = LinkConfig::default().with_reply_timeout(Duration::from_millis(80));
    let (device, _sim, _link) = common::simulated_device(config, |req| {
        match req.sequence_id.as_u8() {
            // Stay silent on the first request...
            0 => Vec::new(),
            // ...and answer it only after the next one is on the wire.
            _ => vec![
                reply_frame(
                    req.module_id,
                    CommandType::Success,
                    aclink::SequenceId::new(0),
                    b"late",
                ),
                reply_frame(req.module_id, CommandType::Success, req.sequence_id, b"fresh"),
            ],
        }
    })
    .unwrap();

    let err = device.gui_operations().send_command(b"draw").unwrap_err();
    assert!(matches!(err, Error::Timeout));

    let reply = device.gui_operations().send_command(b"draw").unwrap();
    assert_eq!(reply.payload, b"fresh");

    let stats = device.stats();
    assert_eq!(stats.stale_dropped, 1);
    assert_eq!(stats.out_of_order, 0);
    device.shutdown().unwrap();
}
