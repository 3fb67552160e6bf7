//! The seam between the generic engine and a concrete wire format.
//!
//! A [`Protocol`] owns the receive-side state machine of one wire format:
//! it assembles bytes into frames or lines, validates them, and classifies
//! the result. The binary framed format lives in `wirelink-frame`, the AT
//! text format in `wirelink-at`.

use std::fmt;

use crate::error::Result;

/// A validated inbound message, sorted by what the engine must do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<K, S, E> {
    /// A confirmation or response: store it for a waiting request.
    Confirmation {
        /// Correlation key (binary: full command byte; AT: result kind).
        key: K,
        /// Status reported by the module.
        status: S,
    },
    /// An unsolicited message: hand it to the event sink.
    Event(E),
}

/// Receive-side state machine of one wire format.
///
/// `push_byte` is called once per received byte, strictly in arrival order.
/// It returns `None` while a frame/line is still being assembled,
/// `Some(Ok(..))` once a complete message has been validated and classified,
/// and `Some(Err(..))` when a message had to be discarded (checksum mismatch,
/// oversize length, unrecognized content). After returning `Some`, the
/// implementation must be ready for the first byte of the next message.
pub trait Protocol: Send + 'static {
    /// Correlation key of a confirmation.
    type Key: Clone + Eq + fmt::Debug + Send + Sync + 'static;
    /// Status carried by a confirmation.
    type Status: Clone + Eq + fmt::Debug + Send + Sync + 'static;
    /// Decoded unsolicited event.
    type Event: Send + 'static;

    /// Feed one received byte.
    fn push_byte(
        &mut self,
        byte: u8,
    ) -> Option<Result<Classified<Self::Key, Self::Status, Self::Event>>>;

    /// Drop any partially assembled message and return to the idle state.
    fn reset(&mut self);
}
