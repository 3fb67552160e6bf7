//! BinaryModuleBuilder -- fluent builder for [`BinaryModule`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters, confirmation slots, retry policy, and the event
//! sink before the IO task starts.
//!
//! # Example
//!
//! ```no_run
//! use wirelink_frame::builder::BinaryModuleBuilder;
//! use wirelink_frame::frame::FrameProfile;
//! use std::time::Duration;
//!
//! # async fn example() -> wirelink_core::Result<()> {
//! let module = BinaryModuleBuilder::new(FrameProfile::extended_length())
//!     .serial_port("/dev/ttyUSB0")
//!     .command_timeout(Duration::from_millis(300))
//!     .build()
//!     .await?;
//! module.reset().await?;
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

use crate::classify::{first_byte_status, Indication, StatusExtractor};
use crate::frame::FrameProfile;
use crate::module::BinaryModule;
use crate::protocol::FrameProtocol;

/// Fluent builder for [`BinaryModule`].
///
/// Everything except the serial port has a default, so the simplest usage
/// is:
///
/// ```ignore
/// let module = BinaryModuleBuilder::new(FrameProfile::short_length())
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct BinaryModuleBuilder {
    profile: FrameProfile,
    serial_port: Option<String>,
    serial: SerialConfig,
    command_timeout: Duration,
    confirmation_slots: usize,
    auto_retry: bool,
    max_retries: u32,
    status_extractor: StatusExtractor,
    io: IoConfig,
    sink: Box<dyn EventSink<Indication>>,
}

impl BinaryModuleBuilder {
    /// Create a new builder for a module using `profile`.
    pub fn new(profile: FrameProfile) -> Self {
        BinaryModuleBuilder {
            profile,
            serial_port: None,
            serial: SerialConfig::default(),
            command_timeout: Duration::from_millis(500),
            confirmation_slots: DEFAULT_SLOTS,
            auto_retry: false,
            max_retries: 3,
            status_extractor: first_byte_status,
            io: IoConfig::default(),
            sink: Box::new(NullSink),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
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

    /// Set how long a request waits for its confirmation (default: 500ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the number of confirmations that may be pending at once
    /// (default: 2).
    pub fn confirmation_slots(mut self, slots: usize) -> Self {
        self.confirmation_slots = slots;
        self
    }

    /// Enable or disable resending a request after a timeout or a
    /// corrupted confirmation (default: disabled).
    pub fn auto_retry(mut self, enabled: bool) -> Self {
        self.auto_retry = enabled;
        self
    }

    /// Set the maximum number of retry attempts (default: 3).
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Use a module-specific status extractor instead of "first payload
    /// byte".
    pub fn status_extractor(mut self, extract: StatusExtractor) -> Self {
        self.status_extractor = extract;
        self
    }

    /// Override IO task settings.
    pub fn io_config(mut self, config: IoConfig) -> Self {
        self.io = config;
        self
    }

    /// Register the sink that receives indications.
    pub fn event_sink(mut self, sink: impl EventSink<Indication>) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Open the configured serial port and build the module.
    pub async fn build(self) -> Result<BinaryModule> {
        let port = self
            .serial_port
            .clone()
            .ok_or_else(|| Error::InvalidParameter("serial port not set".into()))?;
        let transport = SerialTransport::open_with_config(&port, self.serial.clone()).await?;
        self.build_with_transport(Box::new(transport)).await
    }

    /// Build a [`BinaryModule`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `wirelink-test-harness`).
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<BinaryModule> {
        if self.confirmation_slots == 0 {
            return Err(Error::InvalidParameter(
                "confirmation_slots must be at least 1".into(),
            ));
        }

        let protocol = FrameProtocol::with_status_extractor(self.profile, self.status_extractor);
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
        Ok(BinaryModule::new(session, self.profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirelink_test_harness::MockTransport;

    #[test]
    fn builder_defaults() {
        let builder = BinaryModuleBuilder::new(FrameProfile::short_length());
        assert_eq!(builder.serial.baud_rate, 115_200);
        assert_eq!(builder.command_timeout, Duration::from_millis(500));
        assert_eq!(builder.confirmation_slots, 2);
        assert!(!builder.auto_retry);
        assert!(builder.serial_port.is_none());
    }

    #[test]
    fn builder_setters() {
        let builder = BinaryModuleBuilder::new(FrameProfile::extended_length())
            .serial_port("/dev/ttyACM0")
            .baud_rate(9600)
            .command_timeout(Duration::from_millis(50))
            .confirmation_slots(4)
            .auto_retry(true)
            .max_retries(1);
        assert_eq!(builder.serial_port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(builder.serial.baud_rate, 9600);
        assert_eq!(builder.command_timeout, Duration::from_millis(50));
        assert_eq!(builder.confirmation_slots, 4);
        assert!(builder.auto_retry);
        assert_eq!(builder.max_retries, 1);
    }

    #[tokio::test]
    async fn build_without_port_fails() {
        let result = BinaryModuleBuilder::new(FrameProfile::short_length())
            .build()
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_rejects_zero_slots() {
        let result = BinaryModuleBuilder::new(FrameProfile::short_length())
            .confirmation_slots(0)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_with_mock() {
        let module = BinaryModuleBuilder::new(FrameProfile::extended_length())
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert_eq!(module.profile().max_payload, 964);
        assert!(module.close().await.is_ok());
    }
}
