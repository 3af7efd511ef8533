//! In-memory stand-ins for the database and upload storage, used by unit tests.

pub mod blobs;
pub mod memory;

use std::sync::Arc;

use crate::app::AppState;
use crate::config::AppConfig;

pub use blobs::MemoryBlobStore;
pub use memory::MemoryStore;

pub const TEST_JWT_SECRET: &str = "test-secret-for-unit-tests";

/// Application state backed by fresh in-memory stores. The stores are
/// returned too so tests can inspect what handlers wrote.
pub fn test_state() -> (AppState, Arc<MemoryStore>, Arc<MemoryBlobStore>) {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_JWT_SECRET.to_string();
    config.security.cors_origins = vec![];

    let store = Arc::new(MemoryStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let state = AppState::new(config, store.clone(), blobs.clone()).expect("test state");
    (state, store, blobs)
}
