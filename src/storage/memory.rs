//! In-memory object store, for tests and single-process deployments.
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{validate_key, ObjectStore, StoredObject, UrlSigner};

/// `HashMap`-backed object store. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryStore {
    /// Stored objects by key.
    objects: RwLock<HashMap<String, StoredObject>>,
    /// Signer for object URLs.
    signer: UrlSigner,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(signer: UrlSigner) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer,
        }
    }

    /// Sorted keys of all stored objects.
    ///
    /// # Errors
    /// Errors if the store lock is poisoned.
    pub fn keys(&self) -> anyhow::Result<Vec<String>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| anyhow::anyhow!("Object store lock poisoned"))?;
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        let mut objects = self
            .objects
            .write()
            .map_err(|_| anyhow::anyhow!("Object store lock poisoned"))?;
        objects.insert(
            key.to_owned(),
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<StoredObject>> {
        validate_key(key)?;
        let objects = self
            .objects
            .read()
            .map_err(|_| anyhow::anyhow!("Object store lock poisoned"))?;
        Ok(objects.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        let mut objects = self
            .objects
            .write()
            .map_err(|_| anyhow::anyhow!("Object store lock poisoned"))?;
        objects.remove(key);
        Ok(())
    }

    fn signed_url(&self, key: &str) -> anyhow::Result<String> {
        validate_key(key)?;
        self.signer.sign(key)
    }

    fn signer(&self) -> &UrlSigner {
        &self.signer
    }
}
