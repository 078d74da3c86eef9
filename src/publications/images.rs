//! Ordered images of a publication, each backed by one stored object.
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::db::models::{
    publication,
    publication_image::{self, PublicationImage},
};
use crate::db::{DatabaseConnection, DatabaseTransaction};
use crate::storage::{ObjectStore, StoredObject};

use super::cleanup::{self, Cleanup};
use super::{now, PublicationError};

/// An image together with a signed URL to fetch it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    /// The image record.
    #[serde(flatten)]
    pub image: PublicationImage,
    /// Signed, expiring URL of the image bytes.
    pub url: String,
}

/// The image association manager.
#[derive(Debug, Clone)]
pub struct Images {
    /// Database connection.
    db: DatabaseConnection,
    /// Store holding the image bytes.
    store: Arc<dyn ObjectStore>,
}

/// Object-store key of a new image.
///
/// The millisecond suffix keeps keys unique when a position is reused after
/// a removal whose object is still queued for deletion.
fn image_key(publication_id: i64, order: i64, extension: &str) -> String {
    format!(
        "publications/{publication_id}/images/{order}-{}.{extension}",
        Utc::now().timestamp_millis()
    )
}

/// File extension for an image content type.
fn image_extension(content_type: &str) -> Result<&'static str, PublicationError> {
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|_| PublicationError::InvalidInput(format!("bad content type '{content_type}'")))?;
    if mime.type_() != mime::IMAGE {
        return Err(PublicationError::InvalidInput(format!(
            "'{content_type}' is not an image"
        )));
    }
    mime_guess::get_mime_extensions(&mime)
        .and_then(|extensions| extensions.first().copied())
        .ok_or_else(|| PublicationError::InvalidInput(format!("unknown image type '{content_type}'")))
}

impl Images {
    /// Create the image manager.
    #[must_use]
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// Upload an image and append it to the publication's images.
    ///
    /// # Errors
    /// Errors if the publication does not exist, the content is not an image,
    /// or either store fails. No record or object is left behind on failure.
    #[tracing::instrument(skip(self, bytes))]
    pub async fn add(
        &self,
        publication_id: i64,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublicationImage, PublicationError> {
        if bytes.is_empty() {
            return Err(PublicationError::InvalidInput("empty image".to_owned()));
        }
        let extension = image_extension(content_type)?;
        let mut tx = self.db.begin().await?;
        let outcome = self
            .stage(&mut tx, publication_id, bytes, content_type, extension)
            .await;
        let staged_key = outcome.as_ref().ok().map(|image| image.key.clone());
        match tx.finish(outcome).await {
            Ok(image) => {
                tracing::info!(publication_id, order = image.order, "Image added");
                Ok(image)
            }
            Err(err) => {
                if let Some(key) = staged_key {
                    self.discard(&key).await;
                }
                Err(err)
            }
        }
    }

    /// Upload the bytes and insert the record within `tx`.
    async fn stage(
        &self,
        tx: &mut DatabaseTransaction,
        publication_id: i64,
        bytes: Vec<u8>,
        content_type: &str,
        extension: &str,
    ) -> Result<PublicationImage, PublicationError> {
        if !publication::TxManager::lock(tx, publication_id).await? {
            return Err(PublicationError::NotFound(publication_id));
        }
        let order = publication_image::TxManager::next_order(tx, publication_id).await?;
        let image = PublicationImage {
            publication_id,
            order,
            key: image_key(publication_id, order, extension),
            created_at: now(),
        };
        self.store
            .put(&image.key, bytes, content_type)
            .await
            .map_err(PublicationError::ObjectStoreFailure)?;
        if let Err(err) = publication_image::TxManager::create(tx, &image).await {
            self.discard(&image.key).await;
            return Err(err.into());
        }
        Ok(image)
    }

    /// Best-effort removal of an object that never got a committed record.
    async fn discard(&self, key: &str) {
        if let Err(err) = self.store.delete(key).await {
            tracing::warn!("Unable to discard uploaded object '{key}': {err:?}");
        }
    }

    /// Remove the image at `order` and its stored object.
    ///
    /// # Errors
    /// Errors if the publication or image does not exist, or the store fails.
    /// A failing object deletion is not an error; the key stays queued.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, publication_id: i64, order: i64) -> Result<(), PublicationError> {
        let mut tx = self.db.begin().await?;
        let outcome = Self::remove_in(&mut tx, publication_id, order).await;
        let key = tx.finish(outcome).await?;
        Cleanup::new(self.db.clone(), Arc::clone(&self.store))
            .purge(&[key])
            .await;
        tracing::info!(publication_id, order, "Image removed");
        Ok(())
    }

    /// Queue the key and delete the record. Returns the key.
    async fn remove_in(
        tx: &mut DatabaseTransaction,
        publication_id: i64,
        order: i64,
    ) -> Result<String, PublicationError> {
        if !publication::TxManager::lock(tx, publication_id).await? {
            return Err(PublicationError::NotFound(publication_id));
        }
        let image =
            publication_image::TxManager::find_by_publication_and_order(tx, publication_id, order)
                .await?
                .ok_or(PublicationError::ImageNotFound {
                    publication_id,
                    order,
                })?;
        cleanup::queue(tx, &image.key, &now()).await?;
        publication_image::TxManager::delete_by_publication_and_order(tx, publication_id, order)
            .await?;
        Ok(image.key)
    }

    /// Images of a publication, by position.
    ///
    /// # Errors
    /// Errors on store failure.
    pub async fn list(&self, publication_id: i64) -> Result<Vec<PublicationImage>, PublicationError> {
        let images =
            publication_image::Manager::find_all_by_publication(&self.db, publication_id).await?;
        Ok(images)
    }

    /// Attach signed URLs to image records.
    ///
    /// # Errors
    /// Errors if a URL cannot be signed.
    pub fn views(&self, images: Vec<PublicationImage>) -> Result<Vec<ImageView>, PublicationError> {
        images
            .into_iter()
            .map(|image| {
                let url = self
                    .store
                    .signed_url(&image.key)
                    .map_err(PublicationError::ObjectStoreFailure)?;
                Ok(ImageView { image, url })
            })
            .collect()
    }

    /// Fetch a stored object through a signed URL's parameters.
    ///
    /// # Errors
    /// Errors if the signature is invalid or expired, or there is no such object.
    pub async fn open(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
    ) -> Result<StoredObject, PublicationError> {
        if !self.store.signer().verify(key, expires, signature) {
            return Err(PublicationError::InvalidSignature);
        }
        self.store
            .get(key)
            .await
            .map_err(PublicationError::ObjectStoreFailure)?
            .ok_or_else(|| PublicationError::ObjectNotFound(key.to_owned()))
    }
}
