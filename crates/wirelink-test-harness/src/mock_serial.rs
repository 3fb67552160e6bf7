//! Mock serial transport for deterministic testing of the engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs, plus a side channel ([`MockInjector`]) through
//! which a test can push unsolicited bytes while the transport itself is
//! owned by an IO task.
//!
//! # Example
//!
//! ```
//! use wirelink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Reset request -> reset confirmation with status 0x00.
//! mock.expect(&[0x02, 0x00, 0x00, 0x02], &[0x02, 0x40, 0x01, 0x00, 0x43]);
//! let injector = mock.injector();
//! injector.push(&[0x02, 0x84, 0x00, 0x86]);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use wirelink_core::error::{Error, Result};
use wirelink_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return once the matching request is sent.
    response: Vec<u8>,
}

/// Handle for pushing unsolicited bytes into a [`MockTransport`].
#[derive(Debug, Clone, Default)]
pub struct MockInjector {
    queue: Arc<Mutex<VecDeque<u8>>>,
}

impl MockInjector {
    /// Queue bytes to be returned by later `receive()` calls.
    pub fn push(&self, bytes: &[u8]) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(bytes.iter().copied());
    }

    /// Number of injected bytes not yet received.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn pop_into(&self, buf: &mut [u8]) -> usize {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let n = queue.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(queue.drain(..n)) {
            *slot = byte;
        }
        n
    }
}

/// A mock [`Transport`] for testing without a module attached.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; its response
/// is then returned by subsequent `receive()` calls, at most `chunk_size`
/// bytes at a time. Injected bytes are returned once no scripted response
/// is pending.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// The response data pending for the next `receive()` calls.
    pending_response: Option<Vec<u8>>,
    /// Cursor into the pending response.
    response_cursor: usize,
    /// Upper bound on bytes returned by one `receive()`.
    chunk_size: usize,
    /// Unsolicited bytes pushed by the test.
    injector: MockInjector,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            chunk_size: usize::MAX,
            injector: MockInjector::default(),
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Deliver responses in pieces of at most `chunk_size` bytes, so the
    /// receive path sees partial frames.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Handle for injecting unsolicited bytes after the transport has been
    /// moved into an IO task.
    pub fn injector(&self) -> MockInjector {
        self.injector.clone()
    }

    /// All data sent through this transport, one element per `send()`.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state. When `false`, `send()` and `receive()`
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.pending_response = Some(expectation.response);
            self.response_cursor = 0;
            Ok(())
        } else {
            Err(Error::Protocol(
                "no more expectations in mock transport".into(),
            ))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if let Some(ref response) = self.pending_response {
            let remaining = &response[self.response_cursor..];
            let n = remaining.len().min(buf.len()).min(self.chunk_size);
            buf[..n].copy_from_slice(&remaining[..n]);
            self.response_cursor += n;
            if self.response_cursor >= response.len() {
                self.pending_response = None;
                self.response_cursor = 0;
            }
            if n > 0 {
                return Ok(n);
            }
        }

        let limit = buf.len().min(self.chunk_size);
        let n = self.injector.pop_into(&mut buf[..limit]);
        if n > 0 {
            Ok(n)
        } else {
            Err(Error::Timeout)
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        let request = &[0x02, 0x00, 0x00, 0x02];
        let response = &[0x02, 0x40, 0x01, 0x00, 0x43];
        mock.expect(request, response);

        mock.send(request).await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], response);
    }

    #[tokio::test]
    async fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01, 0x02], &[0xFF]);
        mock.expect(&[0x03, 0x04], &[0xFE]);

        mock.send(&[0x01, 0x02]).await.unwrap();
        mock.send(&[0x03, 0x04]).await.unwrap();

        assert_eq!(mock.sent_data(), &[vec![0x01, 0x02], vec![0x03, 0x04]]);
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xFF]);

        let result = mock.send(&[0x99]).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();
        assert!(matches!(mock.send(&[0x01]).await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_receive_without_data_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn mock_transport_chunked_receive() {
        let mut mock = MockTransport::new().with_chunk_size(2);
        mock.expect(&[0x01], &[0xAA, 0xBB, 0xCC]);
        mock.send(&[0x01]).await.unwrap();

        let mut buf = [0u8; 16];
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB]);
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xCC]);
        assert!(matches!(
            mock.receive(&mut buf, Duration::ZERO).await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn mock_transport_injected_bytes_follow_response() {
        let mut mock = MockTransport::new();
        let injector = mock.injector();
        mock.expect(&[0x01], &[0xAA]);
        injector.push(&[0x10, 0x11]);
        mock.send(&[0x01]).await.unwrap();

        let mut buf = [0u8; 16];
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xAA]);
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0x10, 0x11]);
        assert_eq!(injector.pending(), 0);
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());
        mock.close().await.unwrap();
        assert!(!mock.is_connected());
        assert!(matches!(mock.send(&[0x01]).await, Err(Error::NotConnected)));

        let mut other = MockTransport::new();
        other.set_connected(false);
        let mut buf = [0u8; 4];
        assert!(matches!(
            other.receive(&mut buf, Duration::ZERO).await,
            Err(Error::NotConnected)
        ));
    }
}
