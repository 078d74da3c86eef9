use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod manager;

/// Trait for managing tags.
#[async_trait]
pub trait Manager {
    /// Find all tags attached to a publication, ordered by name.
    async fn find_all_by_publication(&self, publication_id: i64) -> anyhow::Result<Vec<Tag>>;
}

/// Trait for managing transactional tag lookups.
#[async_trait]
pub trait TxManager {
    /// Return the subset of `ids` that exist in the tag table.
    async fn find_existing_ids(&mut self, ids: &[i64]) -> anyhow::Result<Vec<i64>>;
}

#[derive(sqlx::FromRow, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for a tag.
pub struct Tag {
    /// Unique identifier of the tag.
    pub id: i64,
    /// Label of the tag.
    pub name: String,
}
