use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

pub mod manager;

/// Trait for reading publication images.
#[async_trait]
pub trait Manager {
    /// All images of a publication ordered by their position.
    async fn find_all_by_publication(
        &self,
        publication_id: i64,
    ) -> anyhow::Result<Vec<PublicationImage>>;
}

/// Trait for managing transactional publication images.
#[async_trait]
pub trait TxManager {
    /// Insert an image record.
    async fn create(&mut self, image: &PublicationImage) -> anyhow::Result<()>;
    /// All images of a publication ordered by their position.
    async fn find_all_by_publication(
        &mut self,
        publication_id: i64,
    ) -> anyhow::Result<Vec<PublicationImage>>;
    /// Find the image at `order` within a publication.
    async fn find_by_publication_and_order(
        &mut self,
        publication_id: i64,
        order: i64,
    ) -> anyhow::Result<Option<PublicationImage>>;
    /// Position the next image of a publication should take.
    async fn next_order(&mut self, publication_id: i64) -> anyhow::Result<i64>;
    /// Remove the image at `order` within a publication. Returns the number of deleted rows.
    async fn delete_by_publication_and_order(
        &mut self,
        publication_id: i64,
        order: i64,
    ) -> anyhow::Result<u64>;
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for an image attached to a publication.
pub struct PublicationImage {
    /// Foreign key reference to publication id.
    pub publication_id: i64,
    /// Position of the image within the publication.
    /// Identifies the image for removal.
    pub order: i64,
    /// Object-store key of the image bytes.
    pub key: String,
    /// Upload timestamp in RFC 3339 format.
    pub created_at: String,
}

impl FromRow<'_, AnyRow> for PublicationImage {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        Ok(Self {
            publication_id: row.try_get("publication_id")?,
            order: row.try_get("image_order")?,
            key: row.try_get("image_key")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
