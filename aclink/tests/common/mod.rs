// Shared fixtures and helpers for the integration test crates.
#![allow(dead_code)]


pub mod helpers {
    pub use aclink::test_support::*;
}

pub use helpers::*;

/// Route log output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
