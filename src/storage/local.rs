use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{BlobError, BlobStore};

/// Stores uploads on the local filesystem under `root`.
///
/// Returned paths are prefixed with `public_prefix` so they match the
/// route the directory is served from.
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub async fn new(root: impl AsRef<Path>, public_prefix: impl Into<String>) -> Result<Self, BlobError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|source| BlobError::Io {
            path: root.display().to_string(),
            source,
        })?;

        info!(path = %root.display(), "Initialized upload storage");

        Ok(Self {
            root,
            public_prefix: public_prefix.into().trim_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative path below the root, refusing anything that escapes it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, BlobError> {
        let path = Path::new(relative);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.is_empty() || !safe {
            return Err(BlobError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }

    /// Maps a stored path back to its location below the root.
    fn strip_public_prefix<'a>(&self, stored: &'a str) -> &'a str {
        let trimmed = stored.trim_start_matches("./").trim_start_matches('/');
        if self.public_prefix.is_empty() {
            return trimmed;
        }
        trimmed
            .strip_prefix(self.public_prefix.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(trimmed)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, directory: &str, filename: &str, bytes: &[u8]) -> Result<String, BlobError> {
        if filename.contains('/') || filename.contains('\\') {
            return Err(BlobError::InvalidPath(filename.to_string()));
        }
        let dir = self.resolve(directory)?;
        fs::create_dir_all(&dir).await.map_err(|source| BlobError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let target = dir.join(filename);
        fs::write(&target, bytes).await.map_err(|source| BlobError::Io {
            path: target.display().to_string(),
            source,
        })?;

        debug!(path = %target.display(), size = bytes.len(), "Stored upload");

        let relative = format!("{}/{}", directory.trim_matches('/'), filename);
        Ok(if self.public_prefix.is_empty() {
            relative
        } else {
            format!("{}/{}", self.public_prefix, relative)
        })
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        let target = self.resolve(self.strip_public_prefix(path))?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path = %target.display(), "Removed upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BlobError::Io {
                path: target.display().to_string(),
                source,
            }),
        }
    }
}
