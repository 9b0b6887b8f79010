// aclink/src/transport/mod.rs

pub mod mock;
pub mod stream;
pub mod traits;
#[cfg(feature = "usb")]
pub mod usb;

pub use mock::{MockDevice, MockLink, MockTransport};
pub use stream::StreamTransport;
pub use traits::{FrameReader, FrameWriter, Transport, read_frame_from};
#[cfg(feature = "usb")]
pub use usb::UsbTransport;
