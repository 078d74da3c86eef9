//! Object store backed by a local directory.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use actix_web::web;
use async_trait::async_trait;

use super::{validate_key, ObjectStore, StoredObject, UrlSigner};

/// Stores each object as a file at `<root>/<key>`.
///
/// The content type is not persisted; it is guessed from the key's extension on read.
/// File I/O runs on the actix blocking thread pool, so calls need an actix runtime.
#[derive(Debug)]
pub struct LocalStore {
    /// Directory holding the objects.
    root: PathBuf,
    /// Signer for object URLs.
    signer: UrlSigner,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Errors if the directory cannot be created.
    pub fn open(root: &Path, signer: UrlSigner) -> anyhow::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            signer,
        })
    }

    /// Path of the file holding `key`.
    fn path_of(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

/// Run blocking file I/O off the async workers.
async fn run_blocking<T, F>(task: F) -> anyhow::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(task)
        .await
        .map_err(|err| anyhow::anyhow!("Blocking file task failed: {err}"))?;
    Ok(result?)
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> anyhow::Result<()> {
        let path = self.path_of(key)?;
        run_blocking(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
        })
        .await
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<StoredObject>> {
        let path = self.path_of(key)?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        let bytes = run_blocking(move || match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        })
        .await?;
        Ok(bytes.map(|bytes| StoredObject {
            bytes,
            content_type,
        }))
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_of(key)?;
        run_blocking(move || match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        })
        .await
    }

    fn signed_url(&self, key: &str) -> anyhow::Result<String> {
        validate_key(key)?;
        self.signer.sign(key)
    }

    fn signer(&self) -> &UrlSigner {
        &self.signer
    }
}
