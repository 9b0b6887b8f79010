#[path = "../common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use aclink::{Error, LinkConfig, ModuleId};
use serial_test::serial;

#[test]
#[serial]
fn silent_module_times_out_and_releases_link() {
    common::init_logging();
    let config = LinkConfig::default().with_reply_timeout(Duration::from_millis(100));
    let (device, _sim, _link) = common::simulated_device(config, |req| {
        if req.module_id == ModuleId::ContactCard {
            Vec::new()
        } else {
            common::echo_success(req)
        }
    })
    .unwrap();

    let started = Instant::now();
    let err = device.contact_card().send_command(b"atr").unwrap_err();
    assert!(matches!(err, Error::Timeout));
    assert!(started.elapsed() >= Duration::from_millis(100));

    let started = Instant::now();
    let reply = device
        .service_operations()
        .send_command(common::fixtures::led_payload())
        .unwrap();
    assert!(reply.is_success());
    assert!(started.elapsed() < Duration::from_millis(100));

    let stats = device.stats();
    assert_eq!(stats.timeouts, 1);
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn explicit_timeout_overrides_default() {
    let (device, _link) = common::mock_device(LinkConfig::default()).unwrap();
    let started = Instant::now();
    let err = device
        .nxp_ntag()
        .send_with_timeout(b"read", aclink::CommandType::Command, Duration::from_millis(30))
        .unwrap_err();
    assert!(matches!(err, Error::Timeout));
    assert!(started.elapsed() < Duration::from_millis(900));
    device.shutdown().unwrap();
}

#[test]
#[serial]
fn unbounded_timeouts_do_not_wedge_the_link() {
    common::init_logging();
    let config = LinkConfig::default().with_reply_timeout(Duration::from_secs(u64::MAX));
    let (device, _sim, _link) = common::simulated_device(config, common::echo_success).unwrap();

    let mifare = device.mifare().clone();
    let first = std::thread::spawn(move || {
        mifare.send_with_timeout(b"{}", aclink::CommandType::Command, Duration::MAX)
    });
    let reply = first.join().expect("huge timeout must not panic").unwrap();
    assert!(reply.is_success());

    // The configured default (clamped to u64::MAX ms) must not panic either.
    let started = Instant::now();
    let reply = device.contact_card().send_command(b"atr").unwrap();
    assert!(reply.is_success());
    assert!(started.elapsed() < Duration::from_secs(2));
    device.shutdown().unwrap();
}
