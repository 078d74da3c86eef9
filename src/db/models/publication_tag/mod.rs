use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod manager;

/// Trait for managing publication-tag associations.
#[async_trait]
pub trait Manager {
    /// Ids of all publications carrying `tag_id`.
    async fn find_publication_ids_by_tag(&self, tag_id: i64) -> anyhow::Result<Vec<i64>>;
}

/// Trait for managing transactional publication-tag associations.
#[async_trait]
pub trait TxManager {
    /// Insert a bulk of associations.
    async fn insert_bulk(&mut self, associations: Vec<PublicationTag>) -> anyhow::Result<()>;
    /// Delete every association of a publication. Returns the number of deleted rows.
    async fn delete_by_publication(&mut self, publication_id: i64) -> anyhow::Result<u64>;
}

#[derive(sqlx::FromRow, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for the many-to-many link between publications and tags.
pub struct PublicationTag {
    /// Foreign key reference to publication id.
    pub publication_id: i64,
    /// Foreign key reference to tag id.
    pub tag_id: i64,
}

impl PublicationTag {
    /// Create a new association.
    #[must_use]
    pub const fn new(publication_id: i64, tag_id: i64) -> Self {
        Self {
            publication_id,
            tag_id,
        }
    }
}
