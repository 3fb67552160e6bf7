//! Error types for wirelink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport failures, receive-path
//! integrity failures, and correlation failures each get their own variant so
//! callers can tell "the module never answered" apart from "the answer was
//! corrupted" or "the module said no".

/// The error type for all wirelink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/write failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error that does not fit a more specific variant.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a confirmation from the module.
    ///
    /// No corrupt frames were seen while waiting, so the module most likely
    /// never answered (powered off, wrong baud rate, unknown command).
    #[error("timeout waiting for confirmation")]
    Timeout,

    /// Timed out waiting for a confirmation, and frames were discarded for
    /// integrity failures during the wait.
    ///
    /// The confirmation was probably sent but arrived damaged.
    #[error("timeout waiting for confirmation ({dropped} corrupt frame(s) discarded)")]
    CorruptedFrames {
        /// Number of frames discarded while the wait was pending.
        dropped: u32,
    },

    /// A binary frame failed its XOR checksum.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte carried by the frame.
        actual: u8,
    },

    /// A frame declared a payload length larger than the receive buffer.
    #[error("declared length {declared} exceeds receive capacity {capacity}")]
    LengthExceedsCapacity {
        /// Length carried in the frame header.
        declared: usize,
        /// Maximum payload the session accepts.
        capacity: usize,
    },

    /// A text line grew past the configured maximum before its terminator.
    #[error("line exceeds {capacity} bytes")]
    LineTooLong {
        /// Maximum line length the session accepts.
        capacity: usize,
    },

    /// The pending-confirmation table was full and a confirmation was dropped.
    #[error("confirmation table full, confirmation dropped")]
    CorrelatorOverflow,

    /// A confirmation arrived but carried an unexpected status.
    #[error("status mismatch: expected {expected}, got {actual}")]
    StatusMismatch {
        /// The status the caller asked for.
        expected: String,
        /// The status the module reported.
        actual: String,
    },

    /// A frame or line could not be classified and was dropped.
    #[error("unrecognized message: {0}")]
    UnrecognizedMessage(String),

    /// An outbound payload exceeds the module's maximum.
    #[error("payload of {len} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Length of the rejected payload.
        len: usize,
        /// Maximum payload for the module profile.
        max: usize,
    },

    /// An invalid parameter was passed to a builder or request.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the module has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the module was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures where resending the same request is a
    /// reasonable recovery: plain timeouts and corrupted confirmations.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout | Error::CorruptedFrames { .. })
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for confirmation");
    }

    #[test]
    fn error_display_corrupted_frames() {
        let e = Error::CorruptedFrames { dropped: 2 };
        assert_eq!(
            e.to_string(),
            "timeout waiting for confirmation (2 corrupt frame(s) discarded)"
        );
    }

    #[test]
    fn error_display_checksum() {
        let e = Error::ChecksumMismatch {
            expected: 0x4A,
            actual: 0x4B,
        };
        assert_eq!(e.to_string(), "checksum mismatch: expected 0x4A, got 0x4B");
    }

    #[test]
    fn error_display_length() {
        let e = Error::LengthExceedsCapacity {
            declared: 1200,
            capacity: 964,
        };
        assert_eq!(
            e.to_string(),
            "declared length 1200 exceeds receive capacity 964"
        );
    }

    #[test]
    fn error_display_status_mismatch() {
        let e = Error::StatusMismatch {
            expected: "0x00".into(),
            actual: "0x01".into(),
        };
        assert_eq!(e.to_string(), "status mismatch: expected 0x00, got 0x01");
    }

    #[test]
    fn error_display_payload_too_large() {
        let e = Error::PayloadTooLarge { len: 300, max: 255 };
        assert_eq!(e.to_string(), "payload of 300 bytes exceeds maximum of 255");
    }

    #[test]
    fn error_display_overflow() {
        assert_eq!(
            Error::CorrelatorOverflow.to_string(),
            "confirmation table full, confirmation dropped"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn retryable_classification() {
        assert!(Error::Timeout.is_retryable());
        assert!(Error::CorruptedFrames { dropped: 1 }.is_retryable());
        assert!(!Error::CorrelatorOverflow.is_retryable());
        assert!(!Error::NotConnected.is_retryable());
        assert!(!Error::StatusMismatch {
            expected: "OK".into(),
            actual: "ERROR".into()
        }
        .is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
