//! Cloud-init userdata as MIME multipart: building it from part files, and
//! expanding it back into something a human can diff.

pub mod content_type;
pub mod decoder;
pub mod encoder;
pub mod error;
mod helpers;
pub mod types;

pub use content_type::{MarkerTable, TypeResolver};
pub use decoder::{expand, Scanner};
pub use encoder::{write_message, Destination, MultipartBuilder, PartBuilder, PartSpec};
pub use error::{Error, Result};
pub use types::{multipart::boundary_for, Multipart, Part, TransferEncoding};
