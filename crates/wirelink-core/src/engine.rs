//! The correlation engine shared by every wire format.
//!
//! [`Engine`] owns the receive-side state of one module session: the
//! protocol's assembler, the confirmation table, the event sink, and the
//! receive counters. It has two sides:
//!
//! - the **receive path**, [`Engine::on_byte_received`], fed one byte at a
//!   time in arrival order by whoever reads the serial port;
//! - the **caller side**, [`Engine::wait_for_confirmation`], used by code
//!   that has just sent a request and needs the module's answer.
//!
//! The assembler runs under its own mutex so the receive path can be driven
//! from any thread; event dispatch happens after that lock is released.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::correlator::{Correlator, Taken};
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::protocol::{Classified, Protocol};
use crate::stats::{LinkStats, StatsSnapshot};

/// Receive-side state of one module session.
pub struct Engine<P: Protocol> {
    receiver: Mutex<P>,
    correlator: Correlator<P::Key, P::Status>,
    sink: Box<dyn EventSink<P::Event>>,
    stats: Arc<LinkStats>,
}

impl<P: Protocol> Engine<P> {
    /// Create an engine with `slots` confirmation slots.
    pub fn new(protocol: P, slots: usize, sink: impl EventSink<P::Event>) -> Self {
        Engine {
            receiver: Mutex::new(protocol),
            correlator: Correlator::new(slots),
            sink: Box::new(sink),
            stats: Arc::new(LinkStats::default()),
        }
    }

    fn receiver(&self) -> MutexGuard<'_, P> {
        self.receiver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feed one received byte. Must be called for every byte, in order.
    pub fn on_byte_received(&self, byte: u8) {
        let outcome = self.receiver().push_byte(byte);
        match outcome {
            None => {}
            Some(Ok(message)) => self.route(message),
            Some(Err(e)) => self.discard(e),
        }
    }

    /// Feed a chunk of received bytes.
    pub fn on_bytes(&self, bytes: &[u8]) {
        trace!(len = bytes.len(), data = ?bytes, "feeding received bytes");
        for &byte in bytes {
            self.on_byte_received(byte);
        }
    }

    fn route(&self, message: Classified<P::Key, P::Status, P::Event>) {
        self.stats.record_message();
        match message {
            Classified::Confirmation { key, status } => {
                debug!(?key, ?status, "confirmation received");
                self.stats.record_confirmation();
                if self.correlator.insert(key.clone(), status).is_err() {
                    self.stats.record_overflow();
                    warn!(?key, "confirmation table full, dropping confirmation");
                }
            }
            Classified::Event(event) => {
                self.stats.record_event();
                self.sink.deliver(event);
            }
        }
    }

    fn discard(&self, error: Error) {
        match error {
            Error::ChecksumMismatch { .. }
            | Error::LengthExceedsCapacity { .. }
            | Error::LineTooLong { .. } => {
                self.stats.record_corrupt();
                debug!(%error, "discarding corrupt message");
            }
            Error::UnrecognizedMessage(_) => {
                self.stats.record_unrecognized();
                debug!(%error, "discarding unrecognized message");
            }
            other => debug!(error = %other, "discarding message"),
        }
    }

    /// Wait for a confirmation keyed `key` and return its status.
    ///
    /// When `reset` is set the confirmation table is cleared immediately,
    /// before this function returns, so confirmations that arrived earlier
    /// are never observed by the returned future.
    ///
    /// The future resolves with the stored status as soon as a matching
    /// entry appears, [`Error::CorrelatorOverflow`] if the matching
    /// confirmation was dropped for lack of space, and at the deadline with
    /// [`Error::CorruptedFrames`] if corrupt frames were discarded while
    /// waiting or [`Error::Timeout`] otherwise.
    pub fn wait_for_status(
        &self,
        key: P::Key,
        timeout: Duration,
        reset: bool,
    ) -> impl Future<Output = Result<P::Status>> + Send + 'static {
        if reset {
            self.correlator.reset();
        }
        let correlator = self.correlator.clone();
        let stats = Arc::clone(&self.stats);
        let corrupt_at_start = stats.corrupt();
        let deadline = tokio::time::Instant::now() + timeout;

        async move {
            loop {
                let arrived = correlator.arrived();
                match correlator.take(&key) {
                    Some(Taken::Confirmed(status)) => return Ok(status),
                    Some(Taken::Overflowed) => return Err(Error::CorrelatorOverflow),
                    None => {}
                }
                if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                    let dropped = stats.corrupt().saturating_sub(corrupt_at_start);
                    debug!(?key, dropped, "confirmation wait timed out");
                    return Err(if dropped > 0 {
                        Error::CorruptedFrames { dropped }
                    } else {
                        Error::Timeout
                    });
                }
            }
        }
    }

    /// Wait for a confirmation keyed `key` carrying `expected` status.
    ///
    /// Same as [`wait_for_status`](Self::wait_for_status), except that a
    /// confirmation with a different status yields
    /// [`Error::StatusMismatch`].
    pub fn wait_for_confirmation(
        &self,
        key: P::Key,
        expected: P::Status,
        timeout: Duration,
        reset: bool,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let wait = self.wait_for_status(key, timeout, reset);
        async move {
            let status = wait.await?;
            if status == expected {
                Ok(())
            } else {
                Err(Error::StatusMismatch {
                    expected: format!("{expected:?}"),
                    actual: format!("{status:?}"),
                })
            }
        }
    }

    /// Drop any partial frame and every pending confirmation.
    pub fn reset_session(&self) {
        self.receiver().reset();
        self.correlator.reset();
        debug!("session state reset");
    }

    /// Number of confirmations currently stored.
    pub fn pending_confirmations(&self) -> usize {
        self.correlator.pending()
    }

    /// Direct access to the confirmation table.
    pub fn correlator(&self) -> &Correlator<P::Key, P::Status> {
        &self.correlator
    }

    /// Snapshot of the receive counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
