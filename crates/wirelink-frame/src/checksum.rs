//! Single-byte XOR frame checksum.

use wirelink_core::error::{Error, Result};

/// XOR of every byte in `bytes`.
pub fn xor(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Check that the last byte of `frame` equals the XOR of all preceding
/// bytes, start marker included.
pub fn validate(frame: &[u8]) -> Result<()> {
    let Some((&actual, body)) = frame.split_last() else {
        return Err(Error::Protocol("empty frame".into()));
    };
    let expected = xor(body);
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_of_reset_request() {
        assert_eq!(xor(&[0x02, 0x00, 0x00]), 0x02);
        assert_eq!(xor(&[0x02, 0x40, 0x01, 0x00]), 0x43);
        assert_eq!(xor(&[]), 0x00);
    }

    #[test]
    fn validate_accepts_good_frame() {
        assert!(validate(&[0x02, 0x40, 0x01, 0x00, 0x43]).is_ok());
    }

    #[test]
    fn validate_rejects_flipped_bit() {
        match validate(&[0x02, 0x40, 0x01, 0x01, 0x43]) {
            Err(Error::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, 0x42);
                assert_eq!(actual, 0x43);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(matches!(validate(&[]), Err(Error::Protocol(_))));
    }
}
