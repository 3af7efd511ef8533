//! Uploaded file storage and public URL construction.

pub mod local;
pub mod url;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalBlobStore;
pub use url::{absolute_url, RequestOrigin};

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file received from a client, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Binary object storage for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` as `directory/filename` and returns the relative path
    /// recorded on the owning row.
    async fn store(&self, directory: &str, filename: &str, bytes: &[u8]) -> Result<String, BlobError>;

    /// Removes a file previously returned by [`BlobStore::store`]. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), BlobError>;
}

/// Upload directories, relative to the storage root.
pub mod dirs {
    pub const SKILL: &str = "images/skill";
    pub const COMPANY: &str = "images/company";
    pub const SCHOOL: &str = "images/school";
    pub const LANGUAGE: &str = "images/language";
    pub const PROJECT_PLATFORM: &str = "images/project/platform";
    pub const USER_ATTACHMENT: &str = "images/user/attachment";
    pub const USER_PROJECT: &str = "images/user/project/showcase";
    pub const USER_PROJECT_ATTACHMENT: &str = "images/user/project/showcase_attachment";
}

/// `<escaped code><ext>`, used for catalog images.
pub fn catalog_filename(code: &str, original_name: &str) -> String {
    format!("{}{}", escape_code(code), extension(original_name))
}

/// Letters, digits and `-` pass through; every other byte becomes `_XX`.
/// `_` is escaped as well, so distinct codes never share a filename.
fn escape_code(code: &str) -> String {
    let mut escaped = String::with_capacity(code.len());
    for byte in code.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("_{:02X}", byte));
        }
    }
    escaped
}

/// `<timestamp>_<owner>_<title><ext>`, used for user uploads. An empty title is omitted.
pub fn upload_filename(timestamp: i64, owner_id: i64, title: &str, original_name: &str) -> String {
    let title = sanitize(title);
    let ext = extension(original_name);
    if title.is_empty() {
        format!("{}_{}{}", timestamp, owner_id, ext)
    } else {
        format!("{}_{}_{}{}", timestamp, owner_id, title, ext)
    }
}

fn extension(original_name: &str) -> String {
    std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}
