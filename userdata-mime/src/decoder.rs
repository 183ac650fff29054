//! Expands base64 text parts of a userdata file so that it diffs as text.
//!
//! Meant as a git `textconv` filter: boundaries are rewritten to a fixed
//! literal, base64 lines of `text/*` parts are replaced by their decoded
//! content and everything else passes through untouched.

mod header;

use crate::error::{Error, Result};

use base64::{engine::general_purpose::STANDARD, Engine};
use log::trace;

use std::io::{BufRead, Write};

pub const NORMALIZED_BOUNDARY: &str = "--==cloud-multi====";
const BOUNDARY_PREFIX: &str = "--==";
/// 76 encoded characters plus the newline
const MAX_BASE64_LINE: usize = 77;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No Content-Type seen yet
    Preamble,
    /// Inside a part that isn't `text/*`
    OpaquePart,
    TextPart,
    /// A `text/*` part that declared base64 transfer encoding
    Base64TextPart,
}

/// What to write in place of a scanned line
#[derive(Debug, PartialEq, Eq)]
pub enum Emit<'a> {
    Verbatim(&'a str),
    Boundary,
    Decoded(Vec<u8>),
}

impl Emit<'_> {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match self {
            Self::Verbatim(line) => out.write_all(line.as_bytes()),
            Self::Boundary => writeln!(out, "{}", NORMALIZED_BOUNDARY),
            Self::Decoded(bytes) => out.write_all(bytes),
        }
    }
}

fn is_base64_alphabet(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

/// A full line of base64: at most 76 characters, a multiple of 4 of them,
/// nothing outside the alphabet. `line` includes its terminator.
pub fn is_base64_line(line: &str) -> bool {
    let len = line.len();
    if len == 0 || len > MAX_BASE64_LINE || (len - 1) % 4 != 0 {
        return false;
    }

    let body = line.strip_suffix('\n').unwrap_or(line);
    !body.is_empty() && body.bytes().all(is_base64_alphabet)
}

/// Single forward pass over a message, one line at a time
#[derive(Debug)]
pub struct Scanner {
    state: State,
    line: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: State::Preamble,
            line: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of lines scanned so far
    pub fn lines(&self) -> usize {
        self.line
    }

    pub fn scan<'a>(&mut self, line: &'a str) -> Result<Emit<'a>> {
        self.line += 1;

        if line.starts_with(BOUNDARY_PREFIX) {
            return Ok(Emit::Boundary);
        }

        if self.state == State::Base64TextPart && is_base64_line(line) {
            let encoded = line.strip_suffix('\n').unwrap_or(line);
            let decoded = STANDARD.decode(encoded).map_err(|source| Error::Base64 {
                line: self.line,
                source,
            })?;
            return Ok(Emit::Decoded(decoded));
        }

        if let Ok((_, main_type)) = header::content_type_main(line) {
            self.state = if main_type.eq_ignore_ascii_case("text") {
                State::TextPart
            } else {
                State::OpaquePart
            };
            trace!("line {}: {:?}", self.line, self.state);
        } else if header::is_base64_encoding(line) && self.state == State::TextPart {
            self.state = State::Base64TextPart;
            trace!("line {}: {:?}", self.line, self.state);
        }

        Ok(Emit::Verbatim(line))
    }
}

/// Run `input` through a [`Scanner`], writing the result to `out`.
/// `\r\n` terminators are read as `\n`.
pub fn expand<R: BufRead, W: Write>(mut input: R, mut out: W) -> Result<()> {
    let mut scanner = Scanner::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.ends_with(b"\r\n") {
            buf.truncate(buf.len() - 2);
            buf.push(b'\n');
        }

        let line = std::str::from_utf8(&buf).map_err(|_| Error::NotUtf8 {
            line: scanner.lines() + 1,
        })?;
        scanner.scan(line)?.write_to(&mut out)?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn expand_str(input: &str) -> Result<String> {
        let mut out = Vec::new();
        expand(input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn base64_line_shape() {
        assert!(is_base64_line("aGVsbG8K\n"));
        assert!(is_base64_line(&format!("{}\n", "A".repeat(76))));
        // 77 characters plus newline is one too many
        assert!(!is_base64_line(&format!("{}\n", "A".repeat(77))));
        assert!(!is_base64_line("aGVsbG8\n"));
        assert!(!is_base64_line("aGV sbG8\n"));
        assert!(!is_base64_line("\n"));
    }

    #[test]
    fn line_of_78_is_left_alone() {
        let mut scanner = Scanner::new();
        scanner.scan("Content-Type: text/plain\n").unwrap();
        scanner.scan("Content-Transfer-Encoding: base64\n").unwrap();
        assert_eq!(scanner.state(), State::Base64TextPart);

        let long = format!("{}A\n", "QUFB".repeat(19));
        assert_eq!(long.len(), 78);
        assert_eq!(scanner.scan(&long).unwrap(), Emit::Verbatim(&long));
    }

    #[test]
    fn state_transitions() {
        let mut scanner = Scanner::new();
        assert_eq!(scanner.state(), State::Preamble);

        scanner.scan("Content-Transfer-Encoding: base64\n").unwrap();
        assert_eq!(scanner.state(), State::Preamble);

        scanner.scan("Content-Type: application/octet-stream\n").unwrap();
        assert_eq!(scanner.state(), State::OpaquePart);
        scanner.scan("Content-Transfer-Encoding: base64\n").unwrap();
        assert_eq!(scanner.state(), State::OpaquePart);

        scanner.scan("Content-Type: Text/plain\n").unwrap();
        assert_eq!(scanner.state(), State::TextPart);
        scanner.scan("--==cloud-multi======\n").unwrap();
        assert_eq!(scanner.state(), State::TextPart);
        scanner.scan("Content-Transfer-Encoding: base64\n").unwrap();
        assert_eq!(scanner.state(), State::Base64TextPart);

        scanner.scan("Content-Type: image/png\n").unwrap();
        assert_eq!(scanner.state(), State::OpaquePart);
    }

    #[test]
    fn expands_text_only() {
        let input = "Content-Type: multipart/mixed; boundary=\"==cloud-multi======\"\n\
                     MIME-Version: 1.0\n\
                     \n\
                     --==cloud-multi======\n\
                     Content-Type: text/x-shellscript; charset=\"utf-8\"\n\
                     Content-Transfer-Encoding: base64\n\
                     \n\
                     ZWNobyBow6kK\n\
                     \n\
                     --==cloud-multi======\n\
                     Content-Type: application/octet-stream\n\
                     Content-Transfer-Encoding: base64\n\
                     \n\
                     AAEC\n\
                     \n\
                     --==cloud-multi======--\n";

        let expected = "Content-Type: multipart/mixed; boundary=\"==cloud-multi======\"\n\
                        MIME-Version: 1.0\n\
                        \n\
                        --==cloud-multi====\n\
                        Content-Type: text/x-shellscript; charset=\"utf-8\"\n\
                        Content-Transfer-Encoding: base64\n\
                        \n\
                        echo hé\n\
                        \n\
                        --==cloud-multi====\n\
                        Content-Type: application/octet-stream\n\
                        Content-Transfer-Encoding: base64\n\
                        \n\
                        AAEC\n\
                        \n\
                        --==cloud-multi====\n";

        assert_eq!(expand_str(input).unwrap(), expected);
    }

    #[test]
    fn crlf_is_normalized() {
        let input = "Content-Type: text/plain\r\nContent-Transfer-Encoding: base64\r\n\r\naGkK\r\n";
        assert_eq!(
            expand_str(input).unwrap(),
            "Content-Type: text/plain\nContent-Transfer-Encoding: base64\n\nhi\n"
        );
    }

    #[test]
    fn bad_base64() {
        let input = "Content-Type: text/plain\nContent-Transfer-Encoding: base64\n\nab=c\n";
        let err = expand_str(input).unwrap_err();

        assert!(matches!(err, Error::Base64 { line: 4, .. }));
        assert!(err.is_decode());
    }

    #[test]
    fn not_utf8() {
        let mut out = Vec::new();
        let err = expand(&b"fine\n\xff\xfe\n"[..], &mut out).unwrap_err();

        assert!(matches!(err, Error::NotUtf8 { line: 2 }));
        assert_eq!(out, b"fine\n");
    }
}
