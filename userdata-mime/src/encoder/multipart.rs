use crate::{
    error::{Error, Result},
    helpers::base64_lines,
    types::{Multipart, Part, TransferEncoding},
};

pub struct MultipartBuilder {
    boundary: String,
    parts: Vec<Part>,
}

impl MultipartBuilder {
    /// Create a new empty builder
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Append the provided parts after any already present
    pub fn parts(&mut self, parts: Vec<Part>) {
        let mut parts = parts;
        self.parts.append(&mut parts);
    }

    /// Add a part to the list of parts
    pub fn part(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn build(self) -> Result<Multipart> {
        if self.parts.is_empty() {
            return Err(Error::NoParts);
        }

        Ok(Multipart {
            boundary: self.boundary,
            parts: self.parts,
        })
    }
}

fn encode_body(part: &Part) -> String {
    match part.encoding {
        TransferEncoding::Base64 => base64_lines(part.payload.as_bytes()),
        TransferEncoding::SevenBit => String::from_utf8_lossy(part.payload.as_bytes()).into_owned(),
    }
}

/// The message as it goes on the wire, `\n` line endings throughout
pub fn encode_multipart(message: &Multipart) -> String {
    let mut out = format!(
        "Content-Type: {}\nMIME-Version: 1.0\n\n",
        message.content_type()
    );

    for (i, part) in message.parts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("--");
        out.push_str(&message.boundary);
        out.push('\n');

        for (name, value) in part.headers.iter() {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&encode_body(part));
    }

    out.push_str("\n--");
    out.push_str(&message.boundary);
    out.push_str("--\n");

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{encoder::PartBuilder, types::multipart::boundary_for};

    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn no_parts() {
        let builder = MultipartBuilder::new(boundary_for(1));
        assert!(matches!(builder.build(), Err(Error::NoParts)));
    }

    #[test]
    fn text_and_binary() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("a.txt");
        let bin = dir.path().join("b.bin");
        fs::write(&text, "hello\n").unwrap();
        fs::write(&bin, [0u8, 1, 2]).unwrap();

        let mut builder = MultipartBuilder::new("==cloud-multi====");
        builder.parts(vec![
            PartBuilder::new(&text, mime::TEXT_PLAIN).build().unwrap(),
            PartBuilder::new(&bin, mime::APPLICATION_OCTET_STREAM)
                .build()
                .unwrap(),
        ]);
        let encoded = encode_multipart(&builder.build().unwrap());

        assert_eq!(
            encoded,
            "Content-Type: multipart/mixed; boundary=\"==cloud-multi====\"\n\
             MIME-Version: 1.0\n\
             \n\
             --==cloud-multi====\n\
             Content-Type: text/plain; charset=\"us-ascii\"\n\
             MIME-Version: 1.0\n\
             Content-Transfer-Encoding: 7bit\n\
             Content-Disposition: attachment; filename=\"a.txt\"\n\
             \n\
             hello\n\
             \n\
             --==cloud-multi====\n\
             Content-Type: application/octet-stream\n\
             MIME-Version: 1.0\n\
             Content-Transfer-Encoding: base64\n\
             Content-Disposition: attachment; filename=\"b.bin\"\n\
             \n\
             AAEC\n\
             \n\
             --==cloud-multi====--\n"
        );
    }
}
