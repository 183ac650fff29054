use super::Part;

pub const BOUNDARY_STEM: &str = "==cloud-multi";

#[derive(Debug, Clone)]
pub struct Multipart {
    pub boundary: String,
    pub parts: Vec<Part>,
}

impl Multipart {
    /// The `multipart/mixed` content type naming this message's boundary
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary=\"{}\"", self.boundary)
    }
}

/// Generated boundaries only need to avoid colliding with part bodies, so
/// they are varied by the number of process arguments
pub fn boundary_for(arg_count: usize) -> String {
    format!("{}{}", BOUNDARY_STEM, "==".repeat(arg_count))
}
