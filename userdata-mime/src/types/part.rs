use super::TransferEncoding;

use derivative::Derivative;
use mime::Mime;
use ordered_multimap::ListOrderedMultimap as MultiMap;

pub type Headers = MultiMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One body part of a multipart message, headers in the order they are
/// written out
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Part {
    pub content_type: Mime,
    pub encoding: TransferEncoding,
    pub headers: Headers,
    #[derivative(Debug = "ignore")]
    pub payload: Payload,
}

impl Part {
    pub fn is_text(&self) -> bool {
        self.content_type.type_() == mime::TEXT
    }

    pub fn disposition(&self) -> Option<&str> {
        self.headers
            .get("Content-Disposition")
            .map(String::as_str)
    }
}
