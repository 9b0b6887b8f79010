// aclink/src/transport/usb/descriptor.rs

use rusb::{Device, Direction, TransferType, UsbContext};

/// Bulk endpoints of the reader's data interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkEndpoints {
    pub interface: u8,
    pub in_ep: u8,
    pub out_ep: u8,
}

/// Find the first interface exposing both a bulk IN and a bulk OUT
/// endpoint. CDC-style readers put their data pipe on such an interface.
pub fn find_bulk_endpoints<C: UsbContext>(device: &Device<C>) -> Option<BulkEndpoints> {
    let config = device.active_config_descriptor().ok()?;

    for interface in config.interfaces() {
        for desc in interface.descriptors() {
            let mut in_ep = None;
            let mut out_ep = None;
            for ep in desc.endpoint_descriptors() {
                if ep.transfer_type() != TransferType::Bulk {
                    continue;
                }
                match ep.direction() {
                    Direction::In if in_ep.is_none() => in_ep = Some(ep.address()),
                    Direction::Out if out_ep.is_none() => out_ep = Some(ep.address()),
                    _ => {}
                }
            }
            if let (Some(in_ep), Some(out_ep)) = (in_ep, out_ep) {
                return Some(BulkEndpoints {
                    interface: desc.interface_number(),
                    in_ep,
                    out_ep,
                });
            }
        }
    }
    None
}
