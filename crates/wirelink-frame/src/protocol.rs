//! [`Protocol`] implementation for the binary frame format.

use wirelink_core::error::Result;
use wirelink_core::protocol::{Classified, Protocol};

use crate::assembler::FrameAssembler;
use crate::classify::{self, first_byte_status, Indication, Status, StatusExtractor};
use crate::frame::FrameProfile;

/// Assembler, checksum validator and classifier of one binary module.
pub struct FrameProtocol {
    assembler: FrameAssembler,
    extract: StatusExtractor,
}

impl FrameProtocol {
    /// Protocol using the first-payload-byte status convention.
    pub fn new(profile: FrameProfile) -> Self {
        Self::with_status_extractor(profile, first_byte_status)
    }

    /// Protocol with a module-specific status extractor.
    pub fn with_status_extractor(profile: FrameProfile, extract: StatusExtractor) -> Self {
        FrameProtocol {
            assembler: FrameAssembler::new(profile),
            extract,
        }
    }

    pub fn profile(&self) -> &FrameProfile {
        self.assembler.profile()
    }
}

impl Protocol for FrameProtocol {
    type Key = u8;
    type Status = Status;
    type Event = Indication;

    fn push_byte(&mut self, byte: u8) -> Option<Result<Classified<u8, Status, Indication>>> {
        let frame = match self.assembler.push(byte)? {
            Ok(frame) => frame,
            Err(e) => return Some(Err(e)),
        };
        Some(classify::classify(frame, self.extract))
    }

    fn reset(&mut self) {
        self.assembler.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use wirelink_core::error::Error;

    fn feed(
        protocol: &mut FrameProtocol,
        bytes: &[u8],
    ) -> Vec<Result<Classified<u8, Status, Indication>>> {
        bytes.iter().filter_map(|&b| protocol.push_byte(b)).collect()
    }

    #[test]
    fn confirmation_and_indication() {
        let profile = FrameProfile::short_length();
        let mut protocol = FrameProtocol::new(profile);
        let mut stream = encode_frame(&profile, 0x40, &[0x00]).unwrap().to_vec();
        stream.extend_from_slice(&encode_frame(&profile, 0x84, &[0xAB]).unwrap());

        let out = feed(&mut protocol, &stream);
        assert_eq!(out.len(), 2);
        assert!(matches!(
            out[0],
            Ok(Classified::Confirmation { key: 0x40, status: Status(0x00) })
        ));
        assert!(matches!(&out[1], Ok(Classified::Event(ind)) if ind.command == 0x84));
    }

    #[test]
    fn checksum_failure_is_reported() {
        let mut protocol = FrameProtocol::new(FrameProfile::short_length());
        let out = feed(&mut protocol, &[0x02, 0x40, 0x01, 0x00, 0x42]);
        assert!(matches!(out.as_slice(), [Err(Error::ChecksumMismatch { .. })]));
    }
}
