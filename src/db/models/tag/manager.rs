//! Manager for the tag model.
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::{Any, QueryBuilder, Row as _};

use super::Tag;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find all tags attached to a publication.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_all_by_publication(&self, publication_id: i64) -> anyhow::Result<Vec<Tag>> {
        let statement = "
            SELECT t.id, t.name
            FROM tag t
            JOIN publication_tag pt ON pt.tag_id = t.id
            WHERE pt.publication_id = $1
            ORDER BY t.name
        ";
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, Tag>(statement)
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
    /// Resolve candidate tag ids against the tag table.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_existing_ids(&mut self, ids: &[i64]) -> anyhow::Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut query_builder = QueryBuilder::<Any>::new("SELECT id FROM tag WHERE id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");
        let rows = query_builder.build().fetch_all(&mut *self.tx).await?;
        let existing = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(existing)
    }
}
