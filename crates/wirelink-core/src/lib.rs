//! wirelink-core: Core traits, error taxonomy, and the correlation engine.
//!
//! This crate defines the wire-format-agnostic parts of wirelink. The binary
//! framed protocol (`wirelink-frame`) and the AT text protocol
//! (`wirelink-at`) plug into the same [`Engine`] through the [`Protocol`]
//! trait, so framing, correlation, and event dispatch are written once.
//!
//! # Key types
//!
//! - [`Engine`] -- receive path, confirmation waits, event dispatch
//! - [`Protocol`] -- byte-at-a-time assembler + classifier of one wire format
//! - [`Correlator`] -- bounded table of pending confirmations
//! - [`EventSink`] -- destination for unsolicited events
//! - [`Transport`] -- byte-level communication channel
//! - [`Error`] / [`Result`] -- error handling

pub mod correlator;
pub mod engine;
pub mod error;
pub mod events;
pub mod protocol;
pub mod stats;
pub mod transport;

pub use correlator::{Correlator, Taken, DEFAULT_SLOTS};
pub use engine::Engine;
pub use error::{Error, Result};
pub use events::{CallbackSink, EventSink, NullSink};
pub use protocol::{Classified, Protocol};
pub use stats::{LinkStats, StatsSnapshot};
pub use transport::Transport;
