//! AT command encoding and argument splitting.
//!
//! # Line format
//!
//! ```text
//! AT<keyword>=<arg>,"<arg>"<eol>    set
//! AT<keyword>?<eol>                 query
//! AT<keyword><eol>                  execute
//! ```

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use wirelink_core::error::{Error, Result};

/// One argument of a set command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtArg {
    /// Written bare.
    Int(i64),
    /// Written in double quotes.
    Str(String),
}

impl fmt::Display for AtArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtArg::Int(n) => write!(f, "{n}"),
            AtArg::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for AtArg {
    fn from(n: i64) -> Self {
        AtArg::Int(n)
    }
}

impl From<u8> for AtArg {
    fn from(n: u8) -> Self {
        AtArg::Int(n.into())
    }
}

impl From<&str> for AtArg {
    fn from(s: &str) -> Self {
        AtArg::Str(s.to_string())
    }
}

impl From<String> for AtArg {
    fn from(s: String) -> Self {
        AtArg::Str(s)
    }
}

/// Which form of command to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtCommand {
    /// `AT<keyword>=<args>`
    Set(Vec<AtArg>),
    /// `AT<keyword>?`
    Query,
    /// `AT<keyword>`
    Execute,
}

fn check_text(text: &str, what: &str) -> Result<()> {
    if text.contains(['\r', '\n', '"']) {
        return Err(Error::InvalidParameter(format!(
            "{what} {text:?} contains a quote or line terminator"
        )));
    }
    Ok(())
}

/// Encode one command line, terminator included.
///
/// Fails with [`Error::PayloadTooLarge`] when the line without terminator
/// exceeds `max_line`, and [`Error::InvalidParameter`] when the keyword or
/// a string argument contains a quote or line terminator.
///
/// # Example
///
/// ```
/// use wirelink_at::command::{encode_command, AtArg, AtCommand};
///
/// let line = encode_command(
///     "+CGDCONT",
///     &AtCommand::Set(vec![AtArg::from(1u8), "IP".into(), "internet".into()]),
///     b"\r\n",
///     1024,
/// )
/// .unwrap();
/// assert_eq!(&line[..], b"AT+CGDCONT=1,\"IP\",\"internet\"\r\n");
/// ```
pub fn encode_command(
    keyword: &str,
    command: &AtCommand,
    eol: &[u8],
    max_line: usize,
) -> Result<Bytes> {
    check_text(keyword, "keyword")?;

    let mut line = format!("AT{keyword}");
    match command {
        AtCommand::Set(args) => {
            line.push('=');
            for (i, arg) in args.iter().enumerate() {
                if let AtArg::Str(s) = arg {
                    check_text(s, "argument")?;
                }
                if i > 0 {
                    line.push(',');
                }
                line.push_str(&arg.to_string());
            }
        }
        AtCommand::Query => line.push('?'),
        AtCommand::Execute => {}
    }

    if line.len() > max_line {
        return Err(Error::PayloadTooLarge {
            len: line.len(),
            max: max_line,
        });
    }

    let mut buf = BytesMut::with_capacity(line.len() + eol.len());
    buf.put_slice(line.as_bytes());
    buf.put_slice(eol);
    Ok(buf.freeze())
}

/// Split the argument list of an information line on commas, leaving
/// commas inside double quotes alone. Arguments keep their quotes; see
/// [`unquote`].
pub fn split_args(text: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                args.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }
    args
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(arg: &str) -> &str {
    arg.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(arg)
}

/// Whether `arg` was sent in double quotes.
pub fn is_quoted(arg: &str) -> bool {
    arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRLF: &[u8] = b"\r\n";

    #[test]
    fn encode_forms() {
        let exec = encode_command("", &AtCommand::Execute, CRLF, 64).unwrap();
        assert_eq!(&exec[..], b"AT\r\n");

        let query = encode_command("+CEREG", &AtCommand::Query, CRLF, 64).unwrap();
        assert_eq!(&query[..], b"AT+CEREG?\r\n");

        let set = encode_command("+CEREG", &AtCommand::Set(vec![2i64.into()]), b"\r", 64).unwrap();
        assert_eq!(&set[..], b"AT+CEREG=2\r");
    }

    #[test]
    fn encode_rejects_long_line() {
        let args = AtCommand::Set(vec![AtArg::Str("x".repeat(100))]);
        let result = encode_command("+CGDCONT", &args, CRLF, 64);
        assert!(matches!(result, Err(Error::PayloadTooLarge { max: 64, .. })));
    }

    #[test]
    fn encode_rejects_embedded_quote_or_eol() {
        let args = AtCommand::Set(vec!["a\"b".into()]);
        assert!(matches!(
            encode_command("+X", &args, CRLF, 64),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            encode_command("+X\r\nATZ", &AtCommand::Execute, CRLF, 64),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn split_respects_quotes() {
        let args = split_args(r#"1,"12,34", "01020304" ,7"#);
        assert_eq!(args, vec!["1", "\"12,34\"", "\"01020304\"", "7"]);
        assert_eq!(unquote(args[1]), "12,34");
        assert!(is_quoted(args[2]));
        assert!(!is_quoted(args[3]));
    }

    #[test]
    fn split_edge_cases() {
        assert!(split_args("").is_empty());
        assert_eq!(split_args("READY"), vec!["READY"]);
        assert_eq!(split_args("1,,3"), vec!["1", "", "3"]);
        assert_eq!(split_args("1,"), vec!["1", ""]);
    }

    #[test]
    fn unquote_leaves_bare_args() {
        assert_eq!(unquote("7"), "7");
        assert_eq!(unquote("\""), "\"");
    }
}
