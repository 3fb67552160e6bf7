//! Frame classification and status extraction.

use std::fmt;

use bytes::Bytes;
use wirelink_core::error::{Error, Result};
use wirelink_core::protocol::Classified;

use crate::frame::Frame;

/// Bits of the command byte that carry the category.
pub const CATEGORY_MASK: u8 = 0xC0;

/// Bits of the command byte that carry the command identity.
pub const IDENTITY_MASK: u8 = 0x3F;

/// Message category encoded in a command byte's top two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Host to module.
    Request,
    /// Module's answer to a request.
    Confirmation,
    /// Unsolicited message from the module.
    Indication,
    /// Module's answer to an indication-initiated exchange.
    Response,
}

impl Category {
    /// Category of `command`.
    pub const fn of(command: u8) -> Self {
        match command & CATEGORY_MASK {
            0x00 => Category::Request,
            0x40 => Category::Confirmation,
            0x80 => Category::Indication,
            _ => Category::Response,
        }
    }

    /// Category bits as they appear in a command byte.
    pub const fn bits(self) -> u8 {
        match self {
            Category::Request => 0x00,
            Category::Confirmation => 0x40,
            Category::Indication => 0x80,
            Category::Response => 0xC0,
        }
    }

    /// Build the command byte for `identity` in this category.
    pub const fn command(self, identity: u8) -> u8 {
        (identity & IDENTITY_MASK) | self.bits()
    }
}

/// Status byte carried by a confirmation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub u8);

impl Status {
    /// The conventional success status.
    pub const SUCCESS: Status = Status(0x00);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Extracts the correlation status from a confirmation or response frame.
pub type StatusExtractor = fn(&Frame) -> Status;

/// Default extractor: first payload byte, empty payload counts as success.
pub fn first_byte_status(frame: &Frame) -> Status {
    frame
        .payload
        .first()
        .map(|&b| Status(b))
        .unwrap_or(Status::SUCCESS)
}

/// An unsolicited frame from the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indication {
    /// Full command byte.
    pub command: u8,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Indication {
    /// Command identity without the category bits.
    pub fn identity(&self) -> u8 {
        self.command & IDENTITY_MASK
    }
}

/// A validated frame split into its parts, whatever its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub category: Category,
    /// Command identity without the category bits.
    pub identity: u8,
    pub payload: Bytes,
}

/// Split a validated frame into category, identity and payload.
pub fn decode(frame: Frame) -> Decoded {
    Decoded {
        category: frame.category(),
        identity: frame.identity(),
        payload: frame.payload,
    }
}

/// Sort a validated frame for the engine.
///
/// Confirmations and responses are keyed by their full command byte.
/// A request arriving from the module is reported as unrecognized.
pub fn classify(
    frame: Frame,
    extract: StatusExtractor,
) -> Result<Classified<u8, Status, Indication>> {
    let command = frame.command;
    if matches!(
        frame.category(),
        Category::Confirmation | Category::Response
    ) {
        return Ok(Classified::Confirmation {
            key: command,
            status: extract(&frame),
        });
    }

    let decoded = decode(frame);
    match decoded.category {
        Category::Indication => Ok(Classified::Event(Indication {
            command,
            payload: decoded.payload,
        })),
        _ => Err(Error::UnrecognizedMessage(format!(
            "request frame 0x{command:02X} from module"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::FrameAssembler;
    use crate::frame::{encode_request, FrameProfile};

    fn frame(command: u8, payload: &[u8]) -> Frame {
        Frame {
            command,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[test]
    fn category_from_top_bits() {
        assert_eq!(Category::of(0x00), Category::Request);
        assert_eq!(Category::of(0x41), Category::Confirmation);
        assert_eq!(Category::of(0x84), Category::Indication);
        assert_eq!(Category::of(0xFF), Category::Response);
        assert_eq!(Category::Confirmation.command(0x04), 0x44);
    }

    #[test]
    fn status_debug_is_hex() {
        assert_eq!(format!("{:?}", Status(0x01)), "0x01");
        assert_eq!(Status(0x0A).to_string(), "0x0A");
        assert!(Status::SUCCESS.is_success());
    }

    #[test]
    fn first_byte_status_defaults_to_success() {
        assert_eq!(first_byte_status(&frame(0x40, &[])), Status::SUCCESS);
        assert_eq!(first_byte_status(&frame(0x40, &[0x01, 0x00])), Status(0x01));
    }

    #[test]
    fn confirmation_is_keyed_by_command() {
        let classified = classify(frame(0x41, &[0x00, 0x05]), first_byte_status).unwrap();
        assert_eq!(
            classified,
            Classified::Confirmation {
                key: 0x41,
                status: Status::SUCCESS
            }
        );
    }

    #[test]
    fn response_is_correlated_too() {
        let classified = classify(frame(0xC4, &[0x02]), first_byte_status).unwrap();
        assert!(matches!(
            classified,
            Classified::Confirmation { key: 0xC4, status: Status(0x02) }
        ));
    }

    #[test]
    fn indication_becomes_event() {
        let classified = classify(frame(0x84, &[0x10, 0x20]), first_byte_status).unwrap();
        match classified {
            Classified::Event(ind) => {
                assert_eq!(ind.identity(), 0x04);
                assert_eq!(&ind.payload[..], &[0x10, 0x20]);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn request_from_module_is_unrecognized() {
        let result = classify(frame(0x01, &[]), first_byte_status);
        assert!(matches!(result, Err(Error::UnrecognizedMessage(_))));
    }

    #[test]
    fn decode_keeps_every_category() {
        let decoded = decode(frame(0x04, &[0x01]));
        assert_eq!(decoded.category, Category::Request);
        assert_eq!(decoded.identity, 0x04);
        assert_eq!(&decoded.payload[..], &[0x01]);

        assert_eq!(decode(frame(0xC4, &[])).category, Category::Response);
        assert_eq!(decode(frame(0x84, &[])).identity, 0x04);
    }

    #[test]
    fn encoded_requests_decode_back_at_every_length() {
        for profile in [FrameProfile::short_length(), FrameProfile::extended_length()] {
            let mut assembler = FrameAssembler::new(profile);
            for len in 0..=profile.max_payload {
                let identity = (len % 64) as u8;
                let payload: Vec<u8> = (0..len).map(|i| (i * 13 + len) as u8).collect();
                let bytes = encode_request(&profile, identity, &payload).unwrap();

                let frames: Vec<_> = bytes.iter().filter_map(|&b| assembler.push(b)).collect();
                assert_eq!(frames.len(), 1, "len {len}");
                let decoded = decode(frames.into_iter().next().unwrap().unwrap());
                assert_eq!(decoded.category, Category::Request, "len {len}");
                assert_eq!(decoded.identity, identity, "len {len}");
                assert_eq!(&decoded.payload[..], &payload[..], "len {len}");
            }
        }
    }

    #[test]
    fn custom_extractor() {
        fn second_byte(frame: &Frame) -> Status {
            Status(frame.payload.get(1).copied().unwrap_or(0))
        }
        let classified = classify(frame(0x41, &[0x00, 0x07]), second_byte).unwrap();
        assert!(matches!(
            classified,
            Classified::Confirmation { status: Status(0x07), .. }
        ));
    }
}
