//! Manager for the publication tag model.
use crate::db::{models::BATCH_SIZE, DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Row as _};

use super::PublicationTag;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Ids of all publications carrying a tag.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_publication_ids_by_tag(&self, tag_id: i64) -> anyhow::Result<Vec<i64>> {
        let statement = "
            SELECT publication_id
            FROM publication_tag
            WHERE tag_id = $1
        ";
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query(statement)
                    .bind(tag_id)
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("publication_id"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a bulk of publication tags into the database.
    ///
    /// # Errors
    /// Errors if the associations cannot be inserted, e.g. on an unknown tag.
    async fn insert_bulk(&mut self, associations: Vec<PublicationTag>) -> anyhow::Result<()> {
        let mut query_builder =
            QueryBuilder::new("INSERT OR IGNORE INTO publication_tag ( publication_id, tag_id ) ");
        for chunk in associations.chunks(BATCH_SIZE) {
            query_builder.push_values(chunk, |mut bindings, pt| {
                bindings.push_bind(pt.publication_id).push_bind(pt.tag_id);
            });
            let query = query_builder.build();
            query.execute(&mut *self.tx).await?;
            query_builder.reset();
        }
        Ok(())
    }

    /// Delete all tag associations of a publication.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn delete_by_publication(&mut self, publication_id: i64) -> anyhow::Result<u64> {
        let statement = "
            DELETE FROM publication_tag
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
