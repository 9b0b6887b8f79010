#[path = "../common/mod.rs"]
mod common;

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::thread;

use aclink::protocol::Frame;
use aclink::transport::read_frame_from;
use aclink::{CommandType, Device, LinkConfig, StreamTransport};
use serial_test::serial;

/// Loopback socket pair: (host end, device end).
fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let host = TcpStream::connect(addr).unwrap();
    let (device, _) = listener.accept().unwrap();
    (host, device)
}

#[test]
#[serial]
fn device_over_byte_stream_with_line_noise() {
    common::init_logging();
    let (host, mut peer) = socket_pair();

    let responder = thread::spawn(move || {
        let mut reader = peer.try_clone().unwrap();
        for _ in 0..2 {
            let request = Frame::decode(&read_frame_from(&mut reader).unwrap()).unwrap();
            let reply = common::reply_frame(
                request.module_id,
                CommandType::Success,
                request.sequence_id,
                &request.payload,
            );
            // Noise ahead of the frame must be skipped by the reader.
            peer.write_all(&[0x00, b'A', 0x7f]).unwrap();
            peer.write_all(&reply).unwrap();
        }
        // Dropping the socket ends the host's read with LinkClosed.
    });

    let transport = StreamTransport::new(host.try_clone().unwrap(), host);
    let device = Device::with_transport(transport, LinkConfig::default()).unwrap();

    let reply = device.service_operations().send_command(b"{}").unwrap();
    assert_eq!(reply.payload, b"{}");
    let reply = device
        .gui_operations()
        .send_command(common::fixtures::led_payload())
        .unwrap();
    assert_eq!(reply.payload, common::fixtures::led_payload());

    responder.join().unwrap();
    device.shutdown().unwrap();
}
