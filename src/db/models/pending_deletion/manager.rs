//! Manager for the pending object deletion model.
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;

use super::PendingDeletion;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Oldest queued keys.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_oldest(&self, limit: i64) -> anyhow::Result<Vec<PendingDeletion>> {
        let statement = "
            SELECT *
            FROM pending_object_deletion
            ORDER BY queued_at, image_key
            LIMIT $1
        ";
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, PendingDeletion>(statement)
                    .bind(limit)
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Dequeue a key.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn delete_by_key(&self, key: &str) -> anyhow::Result<()> {
        let statement = "
            DELETE FROM pending_object_deletion
            WHERE image_key = $1
        ";
        match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query(statement)
                    .bind(key)
                    .execute(&mut *connection)
                    .await?;
            }
        }
        Ok(())
    }

    /// Bump the attempt counter of a key and keep the error.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn record_failure(&self, key: &str, error: &str) -> anyhow::Result<()> {
        let statement = "
            UPDATE pending_object_deletion
            SET attempts = attempts + 1, last_error = $1
            WHERE image_key = $2
        ";
        match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query(statement)
                    .bind(error)
                    .bind(key)
                    .execute(&mut *connection)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Queue a key for deletion.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn queue(&mut self, key: &str, queued_at: &str) -> anyhow::Result<()> {
        let statement = "
            INSERT OR IGNORE INTO pending_object_deletion ( image_key, queued_at, attempts )
            VALUES ( $1, $2, 0 )
        ";
        sqlx::query(statement)
            .bind(key)
            .bind(queued_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
