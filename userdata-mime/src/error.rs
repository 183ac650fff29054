use std::{fmt, io, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Reading a part or writing the message failed
    Io { path: PathBuf, source: io::Error },
    /// Reading or writing an unnamed stream failed
    Stream(io::Error),
    /// A MIME type without a `/` separator, or otherwise unparsable
    InvalidMimeType {
        value: String,
        source: mime::FromStrError,
    },
    /// A part declared as `text/*` whose content is not UTF-8
    NotText { path: PathBuf },
    /// A line inside a base64 text section that doesn't decode
    Base64 {
        line: usize,
        source: base64::DecodeError,
    },
    /// The decoder was fed something other than UTF-8
    NotUtf8 { line: usize },
    NoParts,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised while decoding message content, as opposed to
    /// I/O or usage problems
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Base64 { .. } | Self::NotUtf8 { .. })
    }
}

// Display leaves the source out, it's only available through `source()`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "{}", path.display()),
            Self::Stream(_) => write!(f, "I/O error"),
            Self::InvalidMimeType { value, .. } => {
                write!(f, "invalid MIME type {:?}, expected maintype/subtype", value)
            }
            Self::NotText { path } => {
                write!(f, "{}: declared as text but is not valid UTF-8", path.display())
            }
            Self::Base64 { line, .. } => write!(f, "line {}: invalid base64", line),
            Self::NotUtf8 { line } => write!(f, "line {}: not valid UTF-8", line),
            Self::NoParts => write!(f, "at least one part is required"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Stream(source) => Some(source),
            Self::InvalidMimeType { source, .. } => Some(source),
            Self::Base64 { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Stream(e)
    }
}
