use base64::{engine::general_purpose::STANDARD, Engine};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Encoded lines are 76 characters, which is 57 input bytes
const BASE64_LINE_BYTES: usize = 57;

// RFC 2231 attribute-char, minus what's safer left encoded
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Base64 with every line, including the last, terminated by `\n`
pub fn base64_lines(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() / 3 * 4 + data.len() / BASE64_LINE_BYTES + 4);
    for chunk in data.chunks(BASE64_LINE_BYTES) {
        STANDARD.encode_string(chunk, &mut out);
        out.push('\n');
    }
    out
}

/// `name="value"`, or the RFC 2231 `name*=utf-8''...` form when the value
/// isn't ASCII
pub fn header_param(name: &str, value: &str) -> String {
    if value.is_ascii() {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}=\"{}\"", name, escaped)
    } else {
        format!("{}*=utf-8''{}", name, utf8_percent_encode(value, ATTR_CHAR))
    }
}
