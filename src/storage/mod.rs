//! Key-addressed object storage for uploaded files.
//!
//! Objects live outside the relational transaction boundary: each call is
//! atomic for a single key and nothing more. Callers that tie object
//! lifetimes to database rows go through [`crate::publications::cleanup`].
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};

pub mod local;
pub mod memory;
pub mod signing;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use signing::UrlSigner;

/// An object as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// MIME type the object was uploaded with.
    pub content_type: String,
}

/// Object store adapter.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Upload `bytes` under `key`, replacing any previous object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()>;
    /// Fetch the object under `key`. `Ok(None)` if there is none.
    async fn get(&self, key: &str) -> anyhow::Result<Option<StoredObject>>;
    /// Delete the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    /// A time-limited URL from which the object can be fetched.
    fn signed_url(&self, key: &str) -> anyhow::Result<String>;
    /// The signer backing [`ObjectStore::signed_url`].
    fn signer(&self) -> &UrlSigner;
}

/// Build the object store described by the configuration.
///
/// # Errors
/// Errors if the storage directory cannot be created or the base URL is invalid.
pub fn from_config(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let signer = UrlSigner::new(&config.base_url, &config.secret, config.url_ttl_secs)?;
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new(signer)),
        StorageBackend::Local => Arc::new(LocalStore::open(&config.path, signer)?),
    };
    tracing::info!("Using {:?} object store", config.backend);
    Ok(store)
}

/// Reject keys that could escape the store's namespace.
///
/// # Errors
/// Errors if the key is empty, absolute or contains `.`/`..` segments.
pub fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty() || key.starts_with('/') {
        anyhow::bail!("Invalid object key: '{key}'");
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        anyhow::bail!("Invalid object key: '{key}'");
    }
    Ok(())
}
