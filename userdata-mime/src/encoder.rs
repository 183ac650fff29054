mod multipart;
mod part;

pub use multipart::{encode_multipart, MultipartBuilder};
pub use part::{PartBuilder, PartSpec};

use crate::{
    error::{Error, Result},
    types::Multipart,
};

use flate2::{Compression, GzBuilder};
use log::info;

use std::{
    convert::Infallible,
    fmt,
    fs::File,
    io::{self, Write},
    path::PathBuf,
    str::FromStr,
};

/// Where the encoded message goes, `-` meaning standard output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl FromStr for Destination {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "-" => Self::Stdout,
            path => Self::File(path.into()),
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("-"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Destination {
    /// Name recorded in the gzip header, the output file without `.gz`
    fn gzip_name(&self) -> Option<String> {
        match self {
            Self::Stdout => None,
            Self::File(path) => {
                let name = path.file_name()?.to_str()?;
                Some(name.strip_suffix(".gz").unwrap_or(name).to_owned())
            }
        }
    }
}

/// Encode `message` into `out`, gzipped (best compression) when `compress`
/// is set
pub fn write_encoded<W: Write>(
    message: &Multipart,
    out: W,
    compress: bool,
    gzip_name: Option<&str>,
) -> io::Result<()> {
    let encoded = encode_multipart(message);

    if compress {
        let mut builder = GzBuilder::new();
        if let Some(name) = gzip_name {
            builder = builder.filename(name);
        }
        let mut gz = builder.write(out, Compression::best());
        gz.write_all(encoded.as_bytes())?;
        gz.finish()?.flush()
    } else {
        let mut out = out;
        out.write_all(encoded.as_bytes())?;
        out.flush()
    }
}

pub fn write_message(message: &Multipart, destination: &Destination, compress: bool) -> Result<()> {
    let gzip_name = destination.gzip_name();

    match destination {
        Destination::Stdout => {
            let stdout = io::stdout();
            write_encoded(message, stdout.lock(), compress, None)?;
        }
        Destination::File(path) => {
            let file = File::create(path).map_err(|e| Error::io(path, e))?;
            write_encoded(message, file, compress, gzip_name.as_deref())
                .map_err(|e| Error::io(path, e))?;
        }
    }

    info!(
        "wrote {} part(s) to {}{}",
        message.parts.len(),
        destination,
        if compress { " (gzip)" } else { "" }
    );
    Ok(())
}
