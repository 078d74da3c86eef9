//! The publication lifecycle: listing, lookup, creation with tags and
//! cascading deletion.
//!
//! Every mutating operation runs in a single [`DatabaseTransaction`] which is
//! committed on success and rolled back on any error. Dependent rows are
//! always removed before the rows they reference.
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use url::Url;

use crate::db::models::{
    publication::{self, Filter, NewPublication, Publication, PublicationSummary, Reference},
    publication_image, publication_tag,
    tag::Tag,
    vote,
};
use crate::db::{DatabaseConnection, DatabaseTransaction};
use crate::storage::ObjectStore;

pub mod cleanup;
pub mod error;
pub mod images;
pub mod tags;
pub mod votes;

pub use cleanup::Cleanup;
pub use error::PublicationError;
pub use images::{ImageView, Images};
pub use tags::Tags;
pub use votes::{VoteToggle, Votes};

/// Current time as fixed-width RFC 3339, so that text ordering is time ordering.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// One page of publications.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Publications on this page.
    pub rows: Vec<PublicationSummary>,
    /// Number of publications matching the filter, across all pages.
    pub count: i64,
}

/// A publication with everything attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationDetail {
    /// Publication, author and vote count.
    #[serde(flatten)]
    pub summary: PublicationSummary,
    /// City of the publication.
    pub city: Reference,
    /// Type of the publication.
    pub publication_type: Reference,
    /// Images by position.
    pub images: Vec<ImageView>,
    /// Attached tags.
    pub tags: Vec<Tag>,
}

/// Report of a cascading delete.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Deletion {
    /// The deleted publication.
    pub publication_id: i64,
    /// Tag associations removed.
    pub tags_removed: u64,
    /// Votes removed.
    pub votes_removed: u64,
    /// Images removed.
    pub images_removed: usize,
    /// Object keys whose deletion failed and that remain queued.
    pub pending_objects: Vec<String>,
}

/// Rows removed inside the delete transaction.
struct RemovedRows {
    /// Tag associations removed.
    tags: u64,
    /// Votes removed.
    votes: u64,
    /// Keys of removed images, queued for deletion.
    image_keys: Vec<String>,
}

/// The publication lifecycle manager.
///
/// Cheap to clone: the database pool and object store are shared.
#[derive(Debug, Clone)]
pub struct Publications {
    /// Database connection.
    db: DatabaseConnection,
    /// Store holding image bytes.
    store: Arc<dyn ObjectStore>,
}

impl Publications {
    /// Create the lifecycle manager.
    #[must_use]
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// The vote ledger over the same database.
    #[must_use]
    pub fn votes(&self) -> Votes {
        Votes::new(self.db.clone())
    }

    /// The tag association manager over the same database.
    #[must_use]
    pub fn tags(&self) -> Tags {
        Tags::new(self.db.clone())
    }

    /// The image association manager over the same stores.
    #[must_use]
    pub fn images(&self) -> Images {
        Images::new(self.db.clone(), Arc::clone(&self.store))
    }

    /// The object cleanup worker over the same stores.
    #[must_use]
    pub fn cleanup(&self) -> Cleanup {
        Cleanup::new(self.db.clone(), Arc::clone(&self.store))
    }

    /// A page of publications matching `filter`, with the total match count.
    ///
    /// A tag filter is resolved to candidate publication ids first.
    ///
    /// # Errors
    /// Errors on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn find_many(&self, filter: &Filter) -> Result<Page, PublicationError> {
        let candidates = match filter.tag_id {
            Some(tag_id) => {
                let ids =
                    publication_tag::Manager::find_publication_ids_by_tag(&self.db, tag_id).await?;
                if ids.is_empty() {
                    return Ok(Page {
                        rows: vec![],
                        count: 0,
                    });
                }
                Some(ids)
            }
            None => None,
        };
        let rows =
            publication::Manager::find_many(&self.db, filter, candidates.as_deref()).await?;
        let count = publication::Manager::count(&self.db, filter, candidates.as_deref()).await?;
        Ok(Page { rows, count })
    }

    /// One publication with author, city, type, images, tags and vote count.
    ///
    /// # Errors
    /// Errors with [`PublicationError::NotFound`] if there is no such publication.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<PublicationDetail, PublicationError> {
        let row = publication::Manager::find_detail_by_id(&self.db, id)
            .await?
            .ok_or(PublicationError::NotFound(id))?;
        let images = publication_image::Manager::find_all_by_publication(&self.db, id).await?;
        let tags = self.tags().tags_of(id).await?;
        Ok(PublicationDetail {
            summary: row.summary,
            city: row.city,
            publication_type: row.publication_type,
            images: self.images().views(images)?,
            tags,
        })
    }

    /// The id of the user who authored publication `id`.
    ///
    /// # Errors
    /// Errors with [`PublicationError::NotFound`] if there is no such publication.
    pub async fn owner_of(&self, id: i64) -> Result<i64, PublicationError> {
        publication::Manager::find_owner_by_id(&self.db, id)
            .await?
            .ok_or(PublicationError::NotFound(id))
    }

    /// Create a publication and attach the existing tags among `tag_ids`.
    ///
    /// With an empty `tag_ids` the tag tables are not touched. If `tag_ids`
    /// is non-empty and none exist, nothing is created.
    ///
    /// # Errors
    /// Errors with [`PublicationError::InvalidReference`] if no tag resolves,
    /// [`PublicationError::InvalidInput`] on malformed data, or on store failure.
    #[tracing::instrument(skip(self, data), fields(user_id = data.user_id))]
    pub async fn create(
        &self,
        data: &NewPublication,
        tag_ids: &[i64],
    ) -> Result<Publication, PublicationError> {
        validate(data)?;
        let mut tx = self.db.begin().await?;
        let outcome = Self::create_in(&mut tx, data, tag_ids).await;
        let created = tx.finish(outcome).await?;
        tracing::info!(publication_id = created.id, "Publication created");
        Ok(created)
    }

    /// Insert the row, then resolve and attach tags.
    async fn create_in(
        tx: &mut DatabaseTransaction,
        data: &NewPublication,
        tag_ids: &[i64],
    ) -> Result<Publication, PublicationError> {
        let id = publication::TxManager::create(tx, data, &now()).await?;
        if !tag_ids.is_empty() {
            tags::attach(tx, id, tag_ids).await?;
        }
        publication::TxManager::find_by_id(tx, id)
            .await?
            .ok_or(PublicationError::NotFound(id))
    }

    /// Delete a publication with its tag associations, votes, images and
    /// stored objects.
    ///
    /// Rows go in one transaction. Object keys are queued in that same
    /// transaction and deleted from the object store after commit,
    /// concurrently; keys whose deletion fails stay queued and are reported.
    ///
    /// # Errors
    /// Errors with [`PublicationError::NotFound`] if there is no such
    /// publication, or on store failure. No row is touched on error.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<Deletion, PublicationError> {
        let mut tx = self.db.begin().await?;
        let outcome = Self::delete_in(&mut tx, id).await;
        let removed = tx.finish(outcome).await?;
        let pending_objects = self.cleanup().purge(&removed.image_keys).await;
        if !pending_objects.is_empty() {
            tracing::warn!(
                publication_id = id,
                ?pending_objects,
                "Publication deleted with objects left for reconciliation"
            );
        }
        tracing::info!(publication_id = id, "Publication deleted");
        Ok(Deletion {
            publication_id: id,
            tags_removed: removed.tags,
            votes_removed: removed.votes,
            images_removed: removed.image_keys.len(),
            pending_objects,
        })
    }

    /// Remove dependent rows, then the publication, under its write lock.
    async fn delete_in(
        tx: &mut DatabaseTransaction,
        id: i64,
    ) -> Result<RemovedRows, PublicationError> {
        if !publication::TxManager::lock(tx, id).await? {
            return Err(PublicationError::NotFound(id));
        }
        let tags = publication_tag::TxManager::delete_by_publication(tx, id).await?;
        let votes = vote::TxManager::delete_by_publication(tx, id).await?;
        let images = publication_image::TxManager::find_all_by_publication(tx, id).await?;
        let queued_at = now();
        let mut image_keys = Vec::with_capacity(images.len());
        for image in images {
            cleanup::queue(tx, &image.key, &queued_at).await?;
            publication_image::TxManager::delete_by_publication_and_order(tx, id, image.order)
                .await?;
            image_keys.push(image.key);
        }
        publication::TxManager::delete_by_id(tx, id).await?;
        Ok(RemovedRows {
            tags,
            votes,
            image_keys,
        })
    }
}

/// Reject publications with blank text fields or a malformed reference link.
fn validate(data: &NewPublication) -> Result<(), PublicationError> {
    for (field, value) in [
        ("title", &data.title),
        ("description", &data.description),
        ("content", &data.content),
    ] {
        if value.trim().is_empty() {
            return Err(PublicationError::InvalidInput(format!("{field} is empty")));
        }
    }
    if let Some(link) = data.reference_link.as_deref() {
        Url::parse(link).map_err(|err| {
            PublicationError::InvalidInput(format!("reference_link '{link}': {err}"))
        })?;
    }
    Ok(())
}
