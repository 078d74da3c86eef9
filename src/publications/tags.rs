//! Many-to-many association between publications and tags.
use crate::db::models::{
    publication,
    publication_tag::{self, PublicationTag},
    tag::{self, Tag},
};
use crate::db::{DatabaseConnection, DatabaseTransaction};

use super::PublicationError;

/// Replace the tag set of a publication with the tags of `tag_ids` that exist.
///
/// Unknown ids are dropped. If `tag_ids` is non-empty and none of them exist,
/// nothing is written and [`PublicationError::InvalidReference`] is returned.
/// An empty `tag_ids` clears the set. Returns the attached tag ids.
///
/// # Errors
/// Errors on unresolvable tags or a failing statement.
#[tracing::instrument(skip(tx))]
pub async fn attach(
    tx: &mut DatabaseTransaction,
    publication_id: i64,
    tag_ids: &[i64],
) -> Result<Vec<i64>, PublicationError> {
    let resolved = tag::TxManager::find_existing_ids(tx, tag_ids).await?;
    if resolved.is_empty() && !tag_ids.is_empty() {
        return Err(PublicationError::InvalidReference(tag_ids.to_vec()));
    }
    if resolved.len() < tag_ids.len() {
        tracing::debug!(?resolved, "Dropping unknown tag ids");
    }
    publication_tag::TxManager::delete_by_publication(tx, publication_id).await?;
    let associations = resolved
        .iter()
        .map(|tag_id| PublicationTag::new(publication_id, *tag_id))
        .collect();
    publication_tag::TxManager::insert_bulk(tx, associations).await?;
    Ok(resolved)
}

/// Tag operations on existing publications.
#[derive(Debug, Clone)]
pub struct Tags {
    /// Database connection.
    db: DatabaseConnection,
}

impl Tags {
    /// Create the tag manager.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replace the tag set of an existing publication, see [`attach`].
    ///
    /// # Errors
    /// Errors if the publication does not exist, no tag resolves, or the store fails.
    pub async fn set_tags(
        &self,
        publication_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<i64>, PublicationError> {
        let mut tx = self.db.begin().await?;
        let outcome = Self::set_tags_in(&mut tx, publication_id, tag_ids).await;
        tx.finish(outcome).await
    }

    /// Lock the publication, then attach.
    async fn set_tags_in(
        tx: &mut DatabaseTransaction,
        publication_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<i64>, PublicationError> {
        if !publication::TxManager::lock(tx, publication_id).await? {
            return Err(PublicationError::NotFound(publication_id));
        }
        attach(tx, publication_id, tag_ids).await
    }

    /// Tags attached to a publication, by name.
    ///
    /// # Errors
    /// Errors if the store fails.
    pub async fn tags_of(&self, publication_id: i64) -> Result<Vec<Tag>, PublicationError> {
        let tags = tag::Manager::find_all_by_publication(&self.db, publication_id).await?;
        Ok(tags)
    }
}
