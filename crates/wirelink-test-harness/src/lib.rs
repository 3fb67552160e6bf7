//! wirelink-test-harness: Test utilities and mock transports for wirelink.
//!
//! This crate provides [`MockTransport`] for deterministic testing of the
//! correlation engine and module sessions without a physical module, and
//! [`MockInjector`] for pushing unsolicited bytes into a running session.

pub mod mock_serial;

pub use mock_serial::{MockInjector, MockTransport};
