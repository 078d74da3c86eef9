//! Deletion of stored objects whose database rows are gone.
//!
//! Keys are queued in `pending_object_deletion` inside the same transaction
//! that removes their rows, so a committed row deletion always leaves either
//! a deleted object or a queued key. Queued keys are purged after commit and
//! retried by [`Cleanup::reconcile`].
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::db::models::pending_deletion;
use crate::db::{DatabaseConnection, DatabaseTransaction};
use crate::storage::ObjectStore;

use super::PublicationError;

/// Queue `key` for deletion within `tx`.
///
/// # Errors
/// Errors if the key cannot be inserted into the queue.
pub async fn queue(tx: &mut DatabaseTransaction, key: &str, queued_at: &str) -> anyhow::Result<()> {
    pending_deletion::TxManager::queue(tx, key, queued_at).await
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Reconciliation {
    /// Keys taken from the queue.
    pub attempted: usize,
    /// Keys whose objects are now gone.
    pub purged: usize,
    /// Keys still queued after this run.
    pub pending: Vec<String>,
}

/// Purges queued object keys from the object store.
#[derive(Debug, Clone)]
pub struct Cleanup {
    /// Database holding the queue.
    db: DatabaseConnection,
    /// Store holding the objects.
    store: Arc<dyn ObjectStore>,
}

impl Cleanup {
    /// Create a cleanup worker.
    #[must_use]
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// Delete every key from the object store, concurrently.
    ///
    /// A failure on one key does not stop the others. Returns the keys whose
    /// deletion failed; they stay queued.
    #[tracing::instrument(skip(self))]
    pub async fn purge(&self, keys: &[String]) -> Vec<String> {
        let attempts = keys.iter().map(|key| self.purge_one(key));
        join_all(attempts)
            .await
            .into_iter()
            .zip(keys)
            .filter_map(|(purged, key)| (!purged).then(|| key.clone()))
            .collect()
    }

    /// Delete one object and dequeue its key. Returns whether the object is gone.
    async fn purge_one(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(()) => {
                if let Err(err) = pending_deletion::Manager::delete_by_key(&self.db, key).await {
                    tracing::warn!("Object '{key}' deleted but still queued: {err:?}");
                }
                true
            }
            Err(err) => {
                tracing::warn!("Failed to delete object '{key}', left queued: {err:?}");
                if let Err(record_err) =
                    pending_deletion::Manager::record_failure(&self.db, key, &format!("{err:#}"))
                        .await
                {
                    tracing::warn!("Unable to record failure for '{key}': {record_err:?}");
                }
                false
            }
        }
    }

    /// Retry the oldest `limit` queued keys.
    ///
    /// # Errors
    /// Errors if the queue cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self, limit: i64) -> Result<Reconciliation, PublicationError> {
        let queued = pending_deletion::Manager::find_oldest(&self.db, limit).await?;
        let keys: Vec<String> = queued.into_iter().map(|row| row.image_key).collect();
        let pending = self.purge(&keys).await;
        let reconciliation = Reconciliation {
            attempted: keys.len(),
            purged: keys.len() - pending.len(),
            pending,
        };
        tracing::info!(
            attempted = reconciliation.attempted,
            purged = reconciliation.purged,
            "Reconciled pending object deletions"
        );
        Ok(reconciliation)
    }

    /// Keys currently queued, oldest first.
    ///
    /// # Errors
    /// Errors if the queue cannot be read.
    pub async fn pending(&self, limit: i64) -> Result<Vec<String>, PublicationError> {
        let queued = pending_deletion::Manager::find_oldest(&self.db, limit).await?;
        Ok(queued.into_iter().map(|row| row.image_key).collect())
    }
}
