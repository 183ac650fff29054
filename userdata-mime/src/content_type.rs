//! Working out the MIME type of a part file from its name and first line

use crate::error::{Error, Result};

use log::debug;
use mime::Mime;

use std::{
    cmp::Reverse,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// First-line markers understood by cloud-init
pub const CLOUD_INIT_MARKERS: &[(&str, &str)] = &[
    ("#include", "text/x-include-url"),
    ("#include-once", "text/x-include-once-url"),
    ("#!", "text/x-shellscript"),
    ("#cloud-config", "text/cloud-config"),
    ("#cloud-config-archive", "text/cloud-config-archive"),
    ("#upstart-job", "text/upstart-job"),
    ("#part-handler", "text/part-handler"),
    ("#cloud-boothook", "text/cloud-boothook"),
];

const SCRIPT_EXTENSIONS: &[&str] = &["sh", "py", "rb"];

// Suffixes that mean the content is compressed, not what it is
const CONTENT_ENCODINGS: &[(&str, &str)] = &[
    ("gz", "gzip"),
    ("Z", "compress"),
    ("bz2", "bzip2"),
    ("xz", "xz"),
    ("br", "br"),
];

pub(crate) fn parse_mime(value: &str) -> Result<Mime> {
    value.parse().map_err(|source| Error::InvalidMimeType {
        value: value.to_owned(),
        source,
    })
}

/// Marker to type pairs, longest marker first so that `#include-once` is
/// never shadowed by `#include`
#[derive(Debug, Clone)]
pub struct MarkerTable {
    markers: Vec<(String, String)>,
}

impl MarkerTable {
    pub fn new<I, M, T>(markers: I) -> Self
    where
        I: IntoIterator<Item = (M, T)>,
        M: Into<String>,
        T: Into<String>,
    {
        let mut markers: Vec<(String, String)> = markers
            .into_iter()
            .map(|(marker, mime)| (marker.into(), mime.into()))
            .collect();
        markers.sort_by_key(|(marker, _)| Reverse(marker.len()));

        Self { markers }
    }

    pub fn lookup(&self, line: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|(marker, _)| line.starts_with(marker.as_str()))
            .map(|(_, mime)| mime.as_str())
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::new(CLOUD_INIT_MARKERS.iter().copied())
    }
}

/// Guess a type from the file name alone. The second value is the content
/// encoding when the name ends in a compression suffix.
pub fn guess_from_name(path: &Path) -> (Option<String>, Option<&'static str>) {
    let mut name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return (None, None),
    };

    let mut encoding = None;
    if let Some((stem, ext)) = split_extension(name) {
        if let Some((_, enc)) = CONTENT_ENCODINGS.iter().find(|(e, _)| *e == ext) {
            encoding = Some(*enc);
            name = stem;
        }
    }

    let guessed = split_extension(name).and_then(|(_, ext)| {
        let ext = ext.to_ascii_lowercase();
        if SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
            Some("text/x-shellscript".to_owned())
        } else {
            mime_db::lookup(&ext).map(str::to_owned)
        }
    });

    (guessed, encoding)
}

// A leading dot marks a hidden file, not an extension
fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// The first line of the file, `None` when it isn't UTF-8
fn first_line(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut line = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut line)
        .map_err(|e| Error::io(path, e))?;

    Ok(String::from_utf8(line).ok())
}

pub struct TypeResolver {
    markers: MarkerTable,
    default_type: String,
}

impl TypeResolver {
    /// `default_type` is used for files whose name gives nothing away
    pub fn new(markers: MarkerTable, default_type: impl Into<String>) -> Self {
        Self {
            markers,
            default_type: default_type.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> Result<Mime> {
        let (guessed, encoding) = guess_from_name(path);
        let mut mime_type = guessed.unwrap_or_else(|| self.default_type.clone());

        let line = match encoding {
            Some(encoding) => {
                debug!("{}: {} compressed, not sniffing", path.display(), encoding);
                None
            }
            None => first_line(path)?,
        };

        match line {
            Some(line) => {
                if let Some(marked) = self.markers.lookup(&line) {
                    mime_type = marked.to_owned();
                }
            }
            None if mime_type.starts_with("text/") => {
                mime_type = mime::APPLICATION_OCTET_STREAM.to_string();
            }
            None => {}
        }

        debug!("{}: resolved as {}", path.display(), mime_type);
        parse_mime(&mime_type)
    }
}
