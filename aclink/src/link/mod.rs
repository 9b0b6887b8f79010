// aclink/src/link/mod.rs

//! The link engine: one exchange at a time over the shared transport.

pub mod dispatcher;
pub mod exchange;
pub mod sequence;
pub mod stats;

pub use dispatcher::{Delivery, EndpointTable, ReceiveDispatcher};
pub use exchange::{ExchangeGuard, ExchangeId, ExchangeToken, InFlightRequest, LinkLock, Outcome, Routing};
pub use sequence::SequenceAllocator;
pub use stats::{LinkStats, LinkStatsSnapshot};
