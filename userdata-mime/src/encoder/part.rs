use crate::{
    content_type::{parse_mime, TypeResolver},
    error::{Error, Result},
    helpers::header_param,
    types::{part::Headers, Part, Payload, TransferEncoding},
};

use log::{debug, warn};
use mime::Mime;

use std::{
    fs,
    path::{Path, PathBuf},
};

/// A `PATH[<delim>MIME/TYPE]` command line argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec {
    pub path: PathBuf,
    pub mime_type: Option<String>,
}

impl PartSpec {
    /// Splits on the first `delim` only, so the type itself may contain it
    pub fn parse(arg: &str, delim: &str) -> Self {
        let split = if delim.is_empty() {
            None
        } else {
            arg.split_once(delim)
        };

        match split {
            Some((path, mime_type)) => Self {
                path: path.into(),
                mime_type: Some(mime_type.to_owned()),
            },
            None => Self {
                path: arg.into(),
                mime_type: None,
            },
        }
    }

    /// The explicit type if one was given, otherwise whatever the resolver
    /// makes of the file
    pub fn content_type(&self, resolver: &TypeResolver) -> Result<Mime> {
        match &self.mime_type {
            Some(mime_type) => parse_mime(mime_type),
            None => resolver.resolve(&self.path),
        }
    }
}

pub struct PartBuilder {
    path: PathBuf,
    content_type: Mime,
    encoding: Option<TransferEncoding>,
}

impl PartBuilder {
    pub fn new(path: impl Into<PathBuf>, content_type: Mime) -> Self {
        Self {
            path: path.into(),
            content_type,
            encoding: None,
        }
    }

    /// Request a transfer encoding. Only text parts can honour it, anything
    /// else is always base64.
    pub fn encoding(mut self, encoding: TransferEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn build(self) -> Result<Part> {
        let data = fs::read(&self.path).map_err(|e| Error::io(&self.path, e))?;

        let (header_type, encoding, payload) = if self.content_type.type_() == mime::TEXT {
            let text = String::from_utf8(data).map_err(|_| Error::NotText {
                path: self.path.clone(),
            })?;
            let (charset, natural) = if text.is_ascii() {
                ("us-ascii", TransferEncoding::SevenBit)
            } else {
                ("utf-8", TransferEncoding::Base64)
            };

            let encoding = match self.encoding {
                Some(TransferEncoding::SevenBit) if natural == TransferEncoding::Base64 => {
                    warn!(
                        "{}: not ASCII, sending as base64 instead of 7bit",
                        self.path.display()
                    );
                    natural
                }
                Some(requested) => requested,
                None => natural,
            };

            let header_type = format!(
                "{}; {}",
                self.content_type.essence_str(),
                header_param("charset", charset)
            );
            (header_type, encoding, Payload::Text(text))
        } else {
            if self.encoding == Some(TransferEncoding::SevenBit) {
                warn!(
                    "{}: {} parts are always sent as base64",
                    self.path.display(),
                    self.content_type.essence_str()
                );
            }
            (
                self.content_type.essence_str().to_owned(),
                TransferEncoding::Base64,
                Payload::Binary(data),
            )
        };

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_owned(), header_type);
        headers.insert("MIME-Version".to_owned(), "1.0".to_owned());
        headers.insert(
            "Content-Transfer-Encoding".to_owned(),
            encoding.to_string(),
        );
        headers.insert(
            "Content-Disposition".to_owned(),
            format!("attachment; {}", header_param("filename", &attachment_name(&self.path))),
        );

        debug!(
            "{}: {} bytes as {} ({})",
            self.path.display(),
            payload.len(),
            self.content_type,
            encoding
        );

        Ok(Part {
            content_type: self.content_type,
            encoding,
            headers,
            payload,
        })
    }
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
