//! Byte-at-a-time line assembler.

use wirelink_core::error::{Error, Result};

/// Upper bound on the buffer reserved up front; longer lines grow it.
const MAX_PREALLOC: usize = 4096;

/// Splits the receive stream into lines on a one- or two-byte terminator.
///
/// Lines are returned without their terminator; empty lines are skipped.
/// A line whose content grows past `max_line` bytes is discarded up to the
/// next terminator and reported once as [`Error::LineTooLong`].
#[derive(Debug)]
pub struct LineAssembler {
    eol: Vec<u8>,
    max_line: usize,
    /// Longest buffer that can still end in a terminator: content plus
    /// all but the last terminator byte.
    limit: usize,
    buf: Vec<u8>,
    overflowed: bool,
}

impl LineAssembler {
    /// `eol` must be one or two bytes long.
    pub fn new(eol: &[u8], max_line: usize) -> Result<Self> {
        if eol.is_empty() || eol.len() > 2 {
            return Err(Error::InvalidParameter(format!(
                "line terminator must be 1 or 2 bytes, got {}",
                eol.len()
            )));
        }
        let limit = max_line.checked_add(eol.len() - 1).ok_or_else(|| {
            Error::InvalidParameter(format!("max line length {max_line} is too large"))
        })?;
        Ok(LineAssembler {
            eol: eol.to_vec(),
            max_line,
            limit,
            buf: Vec::with_capacity(limit.saturating_add(1).min(MAX_PREALLOC)),
            overflowed: false,
        })
    }

    pub fn max_line(&self) -> usize {
        self.max_line
    }

    /// Feed one byte.
    pub fn push(&mut self, byte: u8) -> Option<Result<String>> {
        self.buf.push(byte);

        if self.buf.ends_with(&self.eol) {
            let len = self.buf.len() - self.eol.len();
            let result = if std::mem::take(&mut self.overflowed) {
                Some(Err(Error::LineTooLong {
                    capacity: self.max_line,
                }))
            } else if len == 0 {
                None
            } else {
                Some(Ok(String::from_utf8_lossy(&self.buf[..len]).into_owned()))
            };
            self.buf.clear();
            return result;
        }

        // Content plus a partial terminator no longer fits.
        if self.buf.len() > self.limit {
            self.overflowed = true;
            let keep = self.eol.len() - 1;
            let start = self.buf.len() - keep;
            self.buf.drain(..start);
        }
        None
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(asm: &mut LineAssembler, bytes: &[u8]) -> Vec<Result<String>> {
        bytes.iter().filter_map(|&b| asm.push(b)).collect()
    }

    #[test]
    fn crlf_lines() {
        let mut asm = LineAssembler::new(b"\r\n", 64).unwrap();
        let out = lines(&mut asm, b"\r\nOK\r\n+CSQ: 20,99\r\n");
        let out: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(out, vec!["OK", "+CSQ: 20,99"]);
    }

    #[test]
    fn single_byte_terminator() {
        let mut asm = LineAssembler::new(b"\n", 64).unwrap();
        let out = lines(&mut asm, b"OK\n\nERROR\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].as_ref().unwrap(), "ERROR");
    }

    #[test]
    fn lone_cr_stays_in_line() {
        let mut asm = LineAssembler::new(b"\r\n", 64).unwrap();
        let out = lines(&mut asm, b"A\rB\r\n");
        assert_eq!(out[0].as_ref().unwrap(), "A\rB");
    }

    #[test]
    fn line_at_capacity_is_kept() {
        let mut asm = LineAssembler::new(b"\r\n", 4).unwrap();
        let out = lines(&mut asm, b"ABCD\r\n");
        assert_eq!(out[0].as_ref().unwrap(), "ABCD");
    }

    #[test]
    fn overlong_line_is_reported_once_then_resyncs() {
        let mut asm = LineAssembler::new(b"\r\n", 4).unwrap();
        let out = lines(&mut asm, b"ABCDEFGHIJ\r\nOK\r\n");
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], Err(Error::LineTooLong { capacity: 4 })));
        assert_eq!(out[1].as_ref().unwrap(), "OK");
    }

    #[test]
    fn reset_drops_partial_line() {
        let mut asm = LineAssembler::new(b"\r\n", 64).unwrap();
        lines(&mut asm, b"+CRE");
        asm.reset();
        let out = lines(&mut asm, b"OK\r\n");
        assert_eq!(out[0].as_ref().unwrap(), "OK");
    }

    #[test]
    fn unbounded_max_line_is_rejected_for_two_byte_terminator() {
        assert!(matches!(
            LineAssembler::new(b"\r\n", usize::MAX),
            Err(Error::InvalidParameter(_))
        ));
        let mut asm = LineAssembler::new(b"\n", usize::MAX).unwrap();
        let out = lines(&mut asm, b"OK\n");
        assert_eq!(out[0].as_ref().unwrap(), "OK");
    }

    #[test]
    fn rejects_bad_terminators() {
        assert!(LineAssembler::new(b"", 64).is_err());
        assert!(LineAssembler::new(b"\r\n\r", 64).is_err());
    }
}
