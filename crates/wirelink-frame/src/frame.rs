//! Binary frame format and encoder.
//!
//! # Frame format
//!
//! ```text
//! 0x02 <cmd> <len> [<len-hi>] [<data>...] <xor>
//! ```
//!
//! - Start marker: `0x02`
//! - `cmd`: command byte; the top two bits carry the [`Category`], the low
//!   six bits the command identity
//! - `len`: payload length, one byte or two bytes little-endian depending
//!   on the module's [`FrameProfile`]
//! - `data`: `len` payload bytes
//! - `xor`: XOR of every preceding byte, start marker included
//!
//! [`Category`]: crate::classify::Category

use bytes::{BufMut, Bytes, BytesMut};
use wirelink_core::error::{Error, Result};

use crate::checksum;
use crate::classify::{Category, IDENTITY_MASK};

/// Start-of-frame marker.
pub const START: u8 = 0x02;

/// Width of the length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    /// One length byte.
    One,
    /// Two length bytes, little-endian.
    Two,
}

impl LengthWidth {
    /// Number of bytes the length field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            LengthWidth::One => 1,
            LengthWidth::Two => 2,
        }
    }
}

/// Framing parameters of one module family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProfile {
    /// Start-of-frame marker.
    pub start: u8,
    /// Width of the length field.
    pub length_width: LengthWidth,
    /// Largest payload the module accepts or sends.
    pub max_payload: usize,
}

impl FrameProfile {
    /// One-byte length field, payloads up to 255 bytes (sub-GHz radio).
    pub const fn short_length() -> Self {
        FrameProfile {
            start: START,
            length_width: LengthWidth::One,
            max_payload: 255,
        }
    }

    /// Two-byte little-endian length field, payloads up to 964 bytes (BLE
    /// module and second sub-GHz radio).
    pub const fn extended_length() -> Self {
        FrameProfile {
            start: START,
            length_width: LengthWidth::Two,
            max_payload: 964,
        }
    }

    /// Bytes in a frame besides the payload.
    pub const fn overhead(&self) -> usize {
        // start + cmd + length + checksum
        3 + self.length_width.bytes()
    }

    /// Size of the largest frame in this profile.
    pub const fn max_frame_len(&self) -> usize {
        self.overhead() + self.max_payload
    }
}

impl Default for FrameProfile {
    fn default() -> Self {
        Self::short_length()
    }
}

/// A validated binary frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Full command byte, category bits included.
    pub command: u8,
    /// Payload bytes (may be empty).
    pub payload: Bytes,
}

impl Frame {
    /// Message category from the command byte's top two bits.
    pub fn category(&self) -> Category {
        Category::of(self.command)
    }

    /// Command identity without the category bits.
    pub fn identity(&self) -> u8 {
        self.command & IDENTITY_MASK
    }
}

/// Encode a frame with an arbitrary command byte.
///
/// Fails with [`Error::PayloadTooLarge`] when `payload` exceeds the
/// profile's maximum.
///
/// # Example
///
/// ```
/// use wirelink_frame::frame::{encode_frame, FrameProfile};
///
/// let bytes = encode_frame(&FrameProfile::short_length(), 0x40, &[0x00]).unwrap();
/// assert_eq!(&bytes[..], &[0x02, 0x40, 0x01, 0x00, 0x43]);
/// ```
pub fn encode_frame(profile: &FrameProfile, command: u8, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > profile.max_payload {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            max: profile.max_payload,
        });
    }

    let mut buf = BytesMut::with_capacity(profile.overhead() + payload.len());
    buf.put_u8(profile.start);
    buf.put_u8(command);
    match profile.length_width {
        LengthWidth::One => buf.put_u8(payload.len() as u8),
        LengthWidth::Two => buf.put_u16_le(payload.len() as u16),
    }
    buf.put_slice(payload);
    let cs = checksum::xor(&buf);
    buf.put_u8(cs);
    Ok(buf.freeze())
}

/// Encode a request frame for command `identity`.
///
/// `identity` must fit in the low six bits; the request category bits are
/// added here.
pub fn encode_request(profile: &FrameProfile, identity: u8, payload: &[u8]) -> Result<Bytes> {
    if identity & !IDENTITY_MASK != 0 {
        return Err(Error::InvalidParameter(format!(
            "command identity 0x{identity:02X} overlaps the category bits"
        )));
    }
    encode_frame(profile, identity | Category::Request.bits(), payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_sizes() {
        let short = FrameProfile::short_length();
        assert_eq!(short.overhead(), 4);
        assert_eq!(short.max_frame_len(), 259);

        let ext = FrameProfile::extended_length();
        assert_eq!(ext.overhead(), 5);
        assert_eq!(ext.max_frame_len(), 969);
    }

    #[test]
    fn encode_reset_request_short() {
        let bytes = encode_request(&FrameProfile::short_length(), 0x00, &[]).unwrap();
        assert_eq!(&bytes[..], &[0x02, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn encode_reset_request_extended() {
        let bytes = encode_request(&FrameProfile::extended_length(), 0x00, &[]).unwrap();
        assert_eq!(&bytes[..], &[0x02, 0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn encode_extended_length_is_little_endian() {
        let payload = vec![0u8; 0x0123];
        let bytes = encode_request(&FrameProfile::extended_length(), 0x04, &payload).unwrap();
        assert_eq!(&bytes[..4], &[0x02, 0x04, 0x23, 0x01]);
        assert_eq!(bytes.len(), 5 + 0x0123);
        assert!(checksum::validate(&bytes).is_ok());
    }

    #[test]
    fn encode_at_max_payload() {
        let profile = FrameProfile::short_length();
        let payload = vec![0xAA; 255];
        let bytes = encode_request(&profile, 0x04, &payload).unwrap();
        assert_eq!(bytes[2], 0xFF);
        assert_eq!(bytes.len(), profile.max_frame_len());
    }

    #[test]
    fn encode_rejects_oversize_payload() {
        let result = encode_request(&FrameProfile::short_length(), 0x04, &[0u8; 256]);
        assert!(matches!(
            result,
            Err(Error::PayloadTooLarge { len: 256, max: 255 })
        ));

        let result = encode_request(&FrameProfile::extended_length(), 0x04, &[0u8; 965]);
        assert!(matches!(
            result,
            Err(Error::PayloadTooLarge { len: 965, max: 964 })
        ));
    }

    #[test]
    fn encode_rejects_identity_with_category_bits() {
        let result = encode_request(&FrameProfile::short_length(), 0x44, &[]);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn frame_category_and_identity() {
        let frame = Frame {
            command: 0x84,
            payload: Bytes::new(),
        };
        assert_eq!(frame.category(), Category::Indication);
        assert_eq!(frame.identity(), 0x04);
    }
}
