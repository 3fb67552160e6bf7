//! AtModuleBuilder -- fluent builder for [`AtModule`] instances.
//!
//! # Example
//!
//! ```no_run
//! use wirelink_at::builder::AtModuleBuilder;
//! use tokio::sync::broadcast;
//!
//! # async fn example() -> wirelink_core::Result<()> {
//! let (events, _rx) = broadcast::channel(64);
//! let modem = AtModuleBuilder::new()
//!     .serial_port("/dev/ttyUSB2")
//!     .event_sink(events)
//!     .build()
//!     .await?;
//! modem.command("+CEREG", &[2i64.into()]).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use wirelink_core::correlator::DEFAULT_SLOTS;
use wirelink_core::engine::Engine;
use wirelink_core::error::{Error, Result};
use wirelink_core::events::{EventSink, NullSink};
use wirelink_core::transport::Transport;
use wirelink_io::{IoConfig, Session, SessionConfig};
use wirelink_transport::{SerialConfig, SerialTransport};

use crate::events::AtEvent;
use crate::module::AtModule;
use crate::protocol::{AtConfig, AtProtocol};

/// Fluent builder for [`AtModule`].
pub struct AtModuleBuilder {
    serial_port: Option<String>,
    serial: SerialConfig,
    at: AtConfig,
    command_timeout: Duration,
    confirmation_slots: usize,
    auto_retry: bool,
    max_retries: u32,
    io: IoConfig,
    sink: Box<dyn EventSink<AtEvent>>,
}

impl AtModuleBuilder {
    pub fn new() -> Self {
        AtModuleBuilder {
            serial_port: None,
            serial: SerialConfig::default(),
            at: AtConfig::default(),
            command_timeout: Duration::from_millis(500),
            confirmation_slots: DEFAULT_SLOTS,
            auto_retry: false,
            max_retries: 3,
            io: IoConfig::default(),
            sink: Box::new(NullSink),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB2` or `COM7`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate (115200).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.serial.baud_rate = baud;
        self
    }

    /// Replace all serial port parameters.
    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        self.serial = config;
        self
    }

    /// Set the line terminator, one or two bytes (default: CR LF).
    pub fn eol(mut self, eol: &[u8]) -> Self {
        self.at.eol = eol.to_vec();
        self
    }

    /// Set the first character of event lines (default: `+`).
    pub fn event_marker(mut self, marker: char) -> Self {
        self.at.event_marker = marker;
        self
    }

    /// Set the longest line accepted in either direction (default: 1024).
    pub fn max_line(mut self, max_line: usize) -> Self {
        self.at.max_line = max_line;
        self
    }

    /// Set how long a command waits for its final result code
    /// (default: 500ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the number of final results that may be pending at once
    /// (default: 2).
    pub fn confirmation_slots(mut self, slots: usize) -> Self {
        self.confirmation_slots = slots;
        self
    }

    /// Enable or disable resending a command after a timeout
    /// (default: disabled).
    pub fn auto_retry(mut self, enabled: bool) -> Self {
        self.auto_retry = enabled;
        self
    }

    /// Set the maximum number of retry attempts (default: 3).
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Override IO task settings.
    pub fn io_config(mut self, config: IoConfig) -> Self {
        self.io = config;
        self
    }

    /// Register the sink that receives event lines.
    pub fn event_sink(mut self, sink: impl EventSink<AtEvent>) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Open the configured serial port and build the module.
    pub async fn build(self) -> Result<AtModule> {
        let port = self
            .serial_port
            .clone()
            .ok_or_else(|| Error::InvalidParameter("serial port not set".into()))?;
        let transport = SerialTransport::open_with_config(&port, self.serial.clone()).await?;
        self.build_with_transport(Box::new(transport)).await
    }

    /// Build an [`AtModule`] with a caller-provided transport.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<AtModule> {
        if self.confirmation_slots == 0 {
            return Err(Error::InvalidParameter(
                "confirmation_slots must be at least 1".into(),
            ));
        }

        let protocol = AtProtocol::new(&self.at)?;
        let engine = Engine::new(protocol, self.confirmation_slots, self.sink);
        let session = Session::start(
            transport,
            engine,
            SessionConfig {
                command_timeout: self.command_timeout,
                auto_retry: self.auto_retry,
                max_retries: self.max_retries,
                io: self.io,
            },
        );
        Ok(AtModule::new(session, self.at))
    }
}

impl Default for AtModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
