//! Byte-at-a-time frame assembler.
//!
//! [`FrameAssembler`] turns the raw receive stream into validated
//! [`Frame`]s. It never allocates after construction: the buffer is sized
//! for the profile's largest frame, and a header declaring a longer payload
//! aborts the frame instead of growing the buffer.
//!
//! ```text
//! WaitStart -> Command -> LengthLow -> [LengthHigh] -> [Data] -> Checksum
//!     ^                                                              |
//!     +--------------------------------------------------------------+
//! ```

use bytes::Bytes;
use tracing::trace;
use wirelink_core::error::{Error, Result};

use crate::checksum;
use crate::frame::{Frame, FrameProfile, LengthWidth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitStart,
    Command,
    LengthLow,
    LengthHigh,
    Data,
    Checksum,
}

/// Receive-side frame state machine.
#[derive(Debug)]
pub struct FrameAssembler {
    profile: FrameProfile,
    state: State,
    buf: Vec<u8>,
    declared: usize,
}

impl FrameAssembler {
    pub fn new(profile: FrameProfile) -> Self {
        FrameAssembler {
            profile,
            state: State::WaitStart,
            buf: Vec::with_capacity(profile.max_frame_len()),
            declared: 0,
        }
    }

    pub fn profile(&self) -> &FrameProfile {
        &self.profile
    }

    /// Whether a frame is partially assembled.
    pub fn in_frame(&self) -> bool {
        self.state != State::WaitStart
    }

    /// Feed one byte.
    ///
    /// Returns `Some(Ok(frame))` when a frame completes with a valid
    /// checksum, `Some(Err(..))` when a frame is aborted, and `None`
    /// otherwise. Bytes outside a frame that are not the start marker are
    /// dropped silently.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame>> {
        match self.state {
            State::WaitStart => {
                if byte == self.profile.start {
                    self.buf.clear();
                    self.buf.push(byte);
                    self.state = State::Command;
                } else {
                    trace!(byte, "discarding byte outside frame");
                }
                None
            }
            State::Command => {
                self.buf.push(byte);
                self.state = State::LengthLow;
                None
            }
            State::LengthLow => {
                self.buf.push(byte);
                self.declared = byte as usize;
                match self.profile.length_width {
                    LengthWidth::One => self.after_length(),
                    LengthWidth::Two => {
                        self.state = State::LengthHigh;
                        None
                    }
                }
            }
            State::LengthHigh => {
                self.buf.push(byte);
                self.declared |= (byte as usize) << 8;
                self.after_length()
            }
            State::Data => {
                self.buf.push(byte);
                if self.buf.len() == self.header_len() + self.declared {
                    self.state = State::Checksum;
                }
                None
            }
            State::Checksum => {
                self.buf.push(byte);
                self.state = State::WaitStart;
                Some(self.finish())
            }
        }
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = State::WaitStart;
        self.buf.clear();
        self.declared = 0;
    }

    fn header_len(&self) -> usize {
        2 + self.profile.length_width.bytes()
    }

    fn after_length(&mut self) -> Option<Result<Frame>> {
        if self.declared > self.profile.max_payload {
            let declared = self.declared;
            self.reset();
            return Some(Err(Error::LengthExceedsCapacity {
                declared,
                capacity: self.profile.max_payload,
            }));
        }
        self.state = if self.declared == 0 {
            State::Checksum
        } else {
            State::Data
        };
        None
    }

    fn finish(&mut self) -> Result<Frame> {
        checksum::validate(&self.buf)?;
        let header = self.header_len();
        let end = self.buf.len() - 1;
        Ok(Frame {
            command: self.buf[1],
            payload: Bytes::copy_from_slice(&self.buf[header..end]),
        })
    }
}
