// Light the reader's blue LED through the service-operations module.
//
// With a path argument (e.g. /dev/ttyACM0) the command goes to real
// hardware; without one a simulated reader acknowledges it.

use aclink::prelude::*;
use aclink::test_support::reply_frame;
use aclink::transport::MockDevice;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (device, _sim) = match std::env::args().nth(1) {
        Some(path) => {
            println!("Opening reader on {}...", path);
            (Device::with_transport(StreamTransport::open(&path)?, LinkConfig::default())?, None)
        }
        None => {
            println!("No device path given, using a simulated reader");
            let mock = MockTransport::new();
            let sim = MockDevice::spawn(mock.handle(), |req| {
                vec![reply_frame(
                    req.module_id,
                    CommandType::Success,
                    req.sequence_id,
                    br#"{"Leds":"ok"}"#,
                )]
            });
            (Device::with_transport(mock, LinkConfig::default())?, Some(sim))
        }
    };

    let command = br#"{"Leds":{"blue":1,"red":0,"green":0}}"#;
    match device.service_operations().send_command(command) {
        Ok(reply) if reply.is_success() => {
            println!("LEDs set: {}", reply.payload_str().unwrap_or("<binary>"));
        }
        Ok(reply) => println!("Reader refused: {:?}", reply.payload_str()),
        Err(e) => println!("Exchange failed: {}", e),
    }

    let stats = device.stats();
    println!(
        "frames sent: {}, received: {}",
        stats.frames_sent, stats.frames_received
    );
    // A tty has no close hook, so don't wait for the dispatcher's read.
    drop(device);
    Ok(())
}
