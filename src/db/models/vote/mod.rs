use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod manager;

/// Trait for reading votes.
#[async_trait]
pub trait Manager {
    /// Live number of votes cast on a publication.
    async fn count_by_publication(&self, publication_id: i64) -> anyhow::Result<i64>;
    /// Find the vote of a user on a publication.
    async fn find_by_user_and_publication(
        &self,
        user_id: i64,
        publication_id: i64,
    ) -> anyhow::Result<Option<Vote>>;
}

/// Trait for managing transactional votes.
#[async_trait]
pub trait TxManager {
    /// Insert a vote.
    async fn create(&mut self, user_id: i64, publication_id: i64) -> anyhow::Result<()>;
    /// Delete the vote of a user on a publication. Returns the number of deleted rows.
    async fn delete_by_user_and_publication(
        &mut self,
        user_id: i64,
        publication_id: i64,
    ) -> anyhow::Result<u64>;
    /// Delete every vote cast on a publication. Returns the number of deleted rows.
    async fn delete_by_publication(&mut self, publication_id: i64) -> anyhow::Result<u64>;
}

#[derive(sqlx::FromRow, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for a vote. At most one exists per user and publication.
pub struct Vote {
    /// Foreign key reference to the voting user id.
    pub user_id: i64,
    /// Foreign key reference to publication id.
    pub publication_id: i64,
}
