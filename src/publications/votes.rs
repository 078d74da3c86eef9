//! Toggle-style voting: at most one vote per user and publication.
use derive_more::Display;
use serde::Serialize;

use crate::db::models::{publication, vote};
use crate::db::{DatabaseConnection, DatabaseTransaction};

use super::PublicationError;

/// Outcome of a toggle.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteToggle {
    /// The vote was absent and has been cast.
    #[display(fmt = "Vote added")]
    Added,
    /// The vote was present and has been withdrawn.
    #[display(fmt = "Vote removed")]
    Removed,
}

/// The vote ledger.
#[derive(Debug, Clone)]
pub struct Votes {
    /// Database connection.
    db: DatabaseConnection,
}

impl Votes {
    /// Create the vote ledger.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cast the user's vote if absent, withdraw it if present.
    ///
    /// # Errors
    /// Errors with [`PublicationError::NotFound`] if the publication does not
    /// exist (including when it is deleted concurrently), or on store failure.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(
        &self,
        publication_id: i64,
        user_id: i64,
    ) -> Result<VoteToggle, PublicationError> {
        let mut tx = self.db.begin().await?;
        let outcome = Self::toggle_in(&mut tx, publication_id, user_id).await;
        let toggle = tx.finish(outcome).await?;
        tracing::info!(publication_id, user_id, "{toggle}");
        Ok(toggle)
    }

    /// The check and the mutation run under the publication's write lock, so
    /// concurrent toggles and deletes of the same publication are serialized.
    async fn toggle_in(
        tx: &mut DatabaseTransaction,
        publication_id: i64,
        user_id: i64,
    ) -> Result<VoteToggle, PublicationError> {
        if !publication::TxManager::lock(tx, publication_id).await? {
            return Err(PublicationError::NotFound(publication_id));
        }
        let removed =
            vote::TxManager::delete_by_user_and_publication(tx, user_id, publication_id).await?;
        if removed > 0 {
            return Ok(VoteToggle::Removed);
        }
        vote::TxManager::create(tx, user_id, publication_id).await?;
        Ok(VoteToggle::Added)
    }

    /// Live number of votes on a publication.
    ///
    /// # Errors
    /// Errors on store failure.
    pub async fn count(&self, publication_id: i64) -> Result<i64, PublicationError> {
        let count = vote::Manager::count_by_publication(&self.db, publication_id).await?;
        Ok(count)
    }

    /// Whether the user's vote on the publication is present.
    ///
    /// # Errors
    /// Errors on store failure.
    pub async fn has_voted(
        &self,
        publication_id: i64,
        user_id: i64,
    ) -> Result<bool, PublicationError> {
        let vote =
            vote::Manager::find_by_user_and_publication(&self.db, user_id, publication_id).await?;
        Ok(vote.is_some())
    }
}
