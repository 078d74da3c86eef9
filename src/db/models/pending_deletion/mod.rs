use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

pub mod manager;

/// Trait for working the object deletion queue.
#[async_trait]
pub trait Manager {
    /// Oldest queued keys first, at most `limit`.
    async fn find_oldest(&self, limit: i64) -> anyhow::Result<Vec<PendingDeletion>>;
    /// Remove a key from the queue once its object is gone.
    async fn delete_by_key(&self, key: &str) -> anyhow::Result<()>;
    /// Record a failed deletion attempt.
    async fn record_failure(&self, key: &str, error: &str) -> anyhow::Result<()>;
}

/// Trait for queueing keys within a transaction.
#[async_trait]
pub trait TxManager {
    /// Queue an object-store key for deletion. Queueing a key twice is a no-op.
    async fn queue(&mut self, key: &str, queued_at: &str) -> anyhow::Result<()>;
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for an object-store key awaiting deletion.
pub struct PendingDeletion {
    /// Object-store key.
    pub image_key: String,
    /// When the key was queued, RFC 3339.
    pub queued_at: String,
    /// Failed deletion attempts so far.
    pub attempts: i64,
    /// Error of the last failed attempt.
    pub last_error: Option<String>,
}

/// Manual `FromRow`: `last_error` is `NULL` until the first failed attempt,
/// and the `Any` driver cannot decode `NULL` into `Option<String>`.
impl FromRow<'_, AnyRow> for PendingDeletion {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        Ok(Self {
            image_key: row.try_get("image_key")?,
            queued_at: row.try_get("queued_at")?,
            attempts: row.try_get("attempts")?,
            last_error: row.try_get("last_error").ok(),
        })
    }
}
