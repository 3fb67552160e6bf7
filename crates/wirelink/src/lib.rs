//! # wirelink -- command/response correlation for serial wireless modules
//!
//! `wirelink` is an asynchronous Rust library for driving wireless
//! communication modules (sub-GHz radios, BLE, WiFi and cellular modems)
//! over a UART. It frames the byte stream, validates it, matches each
//! confirmation to the request waiting for it, and hands unsolicited
//! events to the application.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! wirelink = { version = "0.1", features = ["binary"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Reset a binary-framed module and listen for received data:
//!
//! ```no_run
//! use wirelink::binary::{BinaryModuleBuilder, FrameProfile, Indication};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::unbounded_channel::<Indication>();
//!     let module = BinaryModuleBuilder::new(FrameProfile::short_length())
//!         .serial_port("/dev/ttyUSB0")
//!         .event_sink(tx)
//!         .build()
//!         .await?;
//!
//!     module.reset().await?;
//!     while let Some(ind) = rx.recv().await {
//!         println!("indication 0x{:02X}: {:02X?}", ind.command, &ind.payload[..]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                   | Purpose                                          |
//! |-------------------------|--------------------------------------------------|
//! | `wirelink-core`         | Engine, correlator, [`Protocol`] seam, errors    |
//! | `wirelink-transport`    | Serial transport                                 |
//! | `wirelink-io`           | IO task and [`Session`]                          |
//! | `wirelink-frame`        | Binary checksummed frames (radio, BLE)           |
//! | `wirelink-at`           | AT command lines (WiFi, cellular)                |
//! | **`wirelink`**          | This facade crate -- re-exports everything       |
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                              | Default |
//! |----------|--------------------------------------|---------|
//! | `binary` | [`binary`] module (framed protocol)  | yes     |
//! | `at`     | [`at`] module (AT commands)          | yes     |
//!
//! ## Errors
//!
//! Every fallible call returns [`Result<T>`](Result). A request that fails
//! tells you why: [`Error::Timeout`] (no answer), [`Error::CorruptedFrames`]
//! (answers arrived damaged), [`Error::StatusMismatch`] (the module
//! refused), or [`Error::CorrelatorOverflow`] (the answer was dropped
//! because too many confirmations were pending).

pub use wirelink_core::*;

pub use wirelink_io::{IoConfig, Session, SessionConfig};
pub use wirelink_transport::{SerialConfig, SerialTransport};

/// Binary checksummed frame protocol.
///
/// Provides [`BinaryModule`](binary::BinaryModule) and
/// [`BinaryModuleBuilder`](binary::BinaryModuleBuilder) for the sub-GHz
/// radios (1-byte length field, [`FrameProfile::short_length`](binary::FrameProfile::short_length))
/// and the BLE module and second radio (2-byte length field,
/// [`FrameProfile::extended_length`](binary::FrameProfile::extended_length)).
#[cfg(feature = "binary")]
pub mod binary {
    pub use wirelink_frame::*;
}

/// AT command protocol.
///
/// Provides [`AtModule`](at::AtModule) and
/// [`AtModuleBuilder`](at::AtModuleBuilder) for WiFi and cellular modules,
/// with typed [`AtEvent`](at::AtEvent)s for registration, signal quality,
/// SIM and packet domain reports.
#[cfg(feature = "at")]
pub mod at {
    pub use wirelink_at::*;
}
