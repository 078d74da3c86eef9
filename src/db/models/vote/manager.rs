//! Manager for the vote model.
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::Row as _;

use super::Vote;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Count votes on a publication.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn count_by_publication(&self, publication_id: i64) -> anyhow::Result<i64> {
        let statement = "
            SELECT COUNT(*) AS votes_count
            FROM vote
            WHERE publication_id = $1
        ";
        let count = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query(statement)
                    .bind(publication_id)
                    .fetch_one(&mut *connection)
                    .await?
                    .try_get::<i64, _>("votes_count")?
            }
        };
        Ok(count)
    }

    /// Find a user's vote on a publication.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_user_and_publication(
        &self,
        user_id: i64,
        publication_id: i64,
    ) -> anyhow::Result<Option<Vote>> {
        let statement = "
            SELECT user_id, publication_id
            FROM vote
            WHERE user_id = $1 AND publication_id = $2
        ";
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, Vote>(statement)
                    .bind(user_id)
                    .bind(publication_id)
                    .fetch_optional(&mut *connection)
                    .await?
            }
        };
        Ok(row)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a vote.
    ///
    /// # Errors
    /// Errors if the vote already exists or references unknown rows.
    async fn create(&mut self, user_id: i64, publication_id: i64) -> anyhow::Result<()> {
        let statement = "
            INSERT INTO vote ( user_id, publication_id )
            VALUES ( $1, $2 )
        ";
        sqlx::query(statement)
            .bind(user_id)
            .bind(publication_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Delete a user's vote on a publication.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn delete_by_user_and_publication(
        &mut self,
        user_id: i64,
        publication_id: i64,
    ) -> anyhow::Result<u64> {
        let statement = "
            DELETE FROM vote
            WHERE user_id = $1 AND publication_id = $2
        ";
        let affected = sqlx::query(statement)
            .bind(user_id)
            .bind(publication_id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(affected)
    }

    /// Delete all votes on a publication.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn delete_by_publication(&mut self, publication_id: i64) -> anyhow::Result<u64> {
        let statement = "
            DELETE FROM vote
            WHERE publication_id = $1
        ";
        let affected = sqlx::query(statement)
            .bind(publication_id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(affected)
    }
}
