use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::storage::{BlobError, BlobStore};

/// Keeps uploads in memory, keyed by the path handed back to callers.
#[derive(Default)]
pub struct MemoryBlobStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    pub fn stored_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, directory: &str, filename: &str, bytes: &[u8]) -> Result<String, BlobError> {
        if filename.contains('/') {
            return Err(BlobError::InvalidPath(filename.to_string()));
        }
        let path = format!("assets/{}/{}", directory.trim_matches('/'), filename);
        self.lock().insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        self.lock().remove(path);
        Ok(())
    }
}
