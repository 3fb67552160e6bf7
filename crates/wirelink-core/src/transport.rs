//! Transport trait for module communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a wireless
//! module. [`SerialTransport`] in `wirelink-transport` drives a real UART or
//! USB CDC port; `MockTransport` from `wirelink-test-harness` replays
//! scripted exchanges for deterministic tests.
//!
//! [`SerialTransport`]: https://docs.rs/wirelink-transport

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a module.
///
/// Implementations deal only in raw bytes. Framing, checksums and
/// correlation live in the engine that consumes the received bytes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the module, returning once they are handed to the
    /// underlying port.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the module into the provided buffer.
    ///
    /// Returns the number of bytes read. Waits up to `timeout` for data and
    /// returns [`Error::Timeout`](crate::error::Error::Timeout) if nothing
    /// arrives.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport. Later `send()`/`receive()` calls return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
