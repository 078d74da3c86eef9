//! Manager for the publication model.
use crate::db::{DatabaseConnection, DatabaseKind, DatabaseTransaction};
use async_trait::async_trait;
use sqlx::{Any, QueryBuilder, Row as _};

use super::{DetailRow, Filter, NewPublication, Publication, PublicationSummary};

/// Columns of a publication summary. Expects `publication p` joined with `user u`.
const SUMMARY_COLUMNS: &str = "
    p.id, p.title, p.description, p.content, p.city_id, p.publication_type_id,
    p.user_id, p.reference_link, p.created_at,
    u.username AS author_username,
    u.first_name AS author_first_name,
    u.last_name AS author_last_name,
    u.image_url AS author_image_url,
    (SELECT COUNT(*) FROM vote v WHERE v.publication_id = p.id) AS votes_count
";

/// Escape `LIKE` wildcards so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Append the `WHERE` conditions shared by the page and count queries.
fn push_filters<'args>(
    query_builder: &mut QueryBuilder<'args, Any>,
    filter: &Filter,
    candidates: Option<&[i64]>,
) {
    query_builder.push(" WHERE 1 = 1");
    if let Some(ids) = candidates {
        query_builder.push(" AND p.id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
    if let Some(publication_type_id) = filter.publication_type_id {
        query_builder
            .push(" AND p.publication_type_id = ")
            .push_bind(publication_type_id);
    }
    let substrings = [
        ("p.title", filter.title.as_ref()),
        ("p.content", filter.content.as_ref()),
        ("p.description", filter.description.as_ref()),
    ];
    for (column, needle) in substrings {
        if let Some(value) = needle {
            query_builder
                .push(format!(" AND LOWER({column}) LIKE "))
                .push_bind(format!("%{}%", escape_like(&value.to_lowercase())))
                .push(" ESCAPE '\\'");
        }
    }
}

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Find a page of publications, newest first.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_many(
        &self,
        filter: &Filter,
        candidates: Option<&[i64]>,
    ) -> anyhow::Result<Vec<PublicationSummary>> {
        let mut query_builder = QueryBuilder::<Any>::new(format!(
            "SELECT {SUMMARY_COLUMNS} FROM publication p JOIN user u ON u.id = p.user_id"
        ));
        push_filters(&mut query_builder, filter, candidates);
        query_builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);
        let rows = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                query_builder
                    .build_query_as::<PublicationSummary>()
                    .fetch_all(&mut *connection)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Count publications matching the filter.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn count(&self, filter: &Filter, candidates: Option<&[i64]>) -> anyhow::Result<i64> {
        let mut query_builder = QueryBuilder::<Any>::new("SELECT COUNT(*) FROM publication p");
        push_filters(&mut query_builder, filter, candidates);
        let count = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                query_builder
                    .build()
                    .fetch_one(&mut *connection)
                    .await?
                    .try_get::<i64, _>(0)?
            }
        };
        Ok(count)
    }

    /// Find a publication with its author, city, type and vote count.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_detail_by_id(&self, id: i64) -> anyhow::Result<Option<DetailRow>> {
        let statement = format!(
            "
            SELECT {SUMMARY_COLUMNS},
                c.name AS city_name,
                pt.name AS publication_type_name
            FROM publication p
            JOIN user u ON u.id = p.user_id
            JOIN city c ON c.id = p.city_id
            JOIN publication_type pt ON pt.id = p.publication_type_id
            WHERE p.id = $1
        "
        );
        let row = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query_as::<_, DetailRow>(&statement)
                    .bind(id)
                    .fetch_optional(&mut *connection)
                    .await?
            }
        };
        Ok(row)
    }

    /// Find the author of a publication.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_owner_by_id(&self, id: i64) -> anyhow::Result<Option<i64>> {
        let statement = "
            SELECT user_id
            FROM publication
            WHERE id = $1
        ";
        let owner = match self.kind {
            DatabaseKind::Sqlite => {
                let mut connection = self.pool.acquire().await?;
                sqlx::query(statement)
                    .bind(id)
                    .fetch_optional(&mut *connection)
                    .await?
                    .map(|row| row.try_get::<i64, _>("user_id"))
                    .transpose()?
            }
        };
        Ok(owner)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new publication into the database.
    ///
    /// # Errors
    /// Errors if the publication cannot be inserted, e.g. on a dangling foreign key.
    async fn create(&mut self, data: &NewPublication, created_at: &str) -> anyhow::Result<i64> {
        let statement = "
            INSERT INTO publication ( title, description, content, city_id, publication_type_id, user_id, reference_link, created_at )
            VALUES ( $1, $2, $3, $4, $5, $6, $7, $8 )
            RETURNING id
        ";
        let id = sqlx::query(statement)
            .bind(&data.title)
            .bind(&data.description)
            .bind(&data.content)
            .bind(data.city_id)
            .bind(data.publication_type_id)
            .bind(data.user_id)
            .bind(data.reference_link.as_deref())
            .bind(created_at)
            .fetch_one(&mut *self.tx)
            .await?
            .try_get::<i64, _>(0)?;
        Ok(id)
    }

    /// Find a publication by id within the transaction.
    ///
    /// # Errors
    /// Errors if can't establish a connection to the database.
    async fn find_by_id(&mut self, id: i64) -> anyhow::Result<Option<Publication>> {
        let statement = "
            SELECT *
            FROM publication
            WHERE id = $1
        ";
        let row = sqlx::query_as::<_, Publication>(statement)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    /// Take the write lock on a publication row.
    ///
    /// A no-op update is the first statement of the transaction, so the lock
    /// is held before any dependent row is read.
    ///
    /// # Errors
    /// Errors if the statement fails.
    async fn lock(&mut self, id: i64) -> anyhow::Result<bool> {
        let statement = "
            UPDATE publication
            SET id = id
            WHERE id = $1
        ";
        let affected = sqlx::query(statement)
            .bind(id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Delete a publication by id.
    ///
    /// # Errors
    /// Errors if rows referencing the publication still exist.
    async fn delete_by_id(&mut self, id: i64) -> anyhow::Result<u64> {
        let statement = "
            DELETE FROM publication
            WHERE id = $1
        ";
        let affected = sqlx::query(statement)
            .bind(id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        Ok(affected)
    }
}
