//! Manager for the publication image model.
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::Row as _;

use super::PublicationImage;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// All images of a publication.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_all_by_publication(
        &self,
        publication_id: i64,
    ) -> anyhow::Result<Vec<PublicationImage>> {
        let statement = "
            SELECT *
            FROM publication_image
            WHERE publication_id = $1
            ORDER BY image_order
        ";
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, PublicationImage>(statement)
                    .bind(publication_id)
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert an image record.
    ///
    /// # Errors
    /// Errors if the position is taken or the publication does not exist.
    async fn create(&mut self, image: &PublicationImage) -> anyhow::Result<()> {
        let statement = "
            INSERT INTO publication_image ( publication_id, image_order, image_key, created_at )
            VALUES ( $1, $2, $3, $4 )
        ";
        sqlx::query(statement)
            .bind(image.publication_id)
            .bind(image.order)
            .bind(&image.key)
            .bind(&image.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// All images of a publication within the transaction.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn find_all_by_publication(
        &mut self,
        publication_id: i64,
    ) -> anyhow::Result<Vec<PublicationImage>> {
        let statement = "
            SELECT *
            FROM publication_image
            WHERE publication_id = $1
            ORDER BY image_order
        ";
        let rows = sqlx::query_as::<_, PublicationImage>(statement)
            .bind(publication_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    /// Find an image by publication and position.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn find_by_publication_and_order(
        &mut self,
        publication_id: i64,
        order: i64,
    ) -> anyhow::Result<Option<PublicationImage>> {
        let statement = "
            SELECT *
            FROM publication_image
            WHERE publication_id = $1 AND image_order = $2
        ";
        let row = sqlx::query_as::<_, PublicationImage>(statement)
            .bind(publication_id)
            .bind(order)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    /// Next free position, starting at 1.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn next_order(&mut self, publication_id: i64) -> anyhow::Result<i64> {
        let statement = "
            SELECT COALESCE(MAX(image_order), 0) + 1 AS next_order
            FROM publication_image
            WHERE publication_id = $1
        ";
        let next = sqlx::query(statement)
            .bind(publication_id)
            .fetch_one(&mut *self.tx)
            .await?
            .try_get::<i64, _>("next_order")?;
        Ok(next)
    }

    /// Remove an image record by publication and position.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn delete_by_publication_and_order(
        &mut self,
        publication_id: i64,
        order: i64,
    ) -> anyhow::Result<u64> {
        let statement = "
            DELETE FROM publication_image
            WHERE publication_id = $1 AND image_order = $2
        ";
        let affected = sqlx::query(statement)
            .bind(publication_id)
            .bind(order)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(affected)
    }
}
