//! Transport implementations for wirelink.
//!
//! - [`SerialTransport`]: UART and USB CDC-ACM connections to wireless
//!   modules, built on `tokio-serial`.
//!
//! Test code uses `MockTransport` from `wirelink-test-harness` instead.

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
