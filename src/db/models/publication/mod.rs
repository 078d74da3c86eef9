use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

pub mod manager;

/// Trait for managing publications.
#[async_trait]
pub trait Manager {
    /// Find a page of publications matching `filter`.
    ///
    /// When `candidates` is given, only publications whose id is in it are considered.
    async fn find_many(
        &self,
        filter: &Filter,
        candidates: Option<&[i64]>,
    ) -> anyhow::Result<Vec<PublicationSummary>>;
    /// Count all publications matching `filter`, ignoring pagination.
    async fn count(&self, filter: &Filter, candidates: Option<&[i64]>) -> anyhow::Result<i64>;
    /// Find a publication by id, together with its city and publication type.
    async fn find_detail_by_id(&self, id: i64) -> anyhow::Result<Option<DetailRow>>;
    /// Find the authoring user id of a publication.
    async fn find_owner_by_id(&self, id: i64) -> anyhow::Result<Option<i64>>;
}

/// Trait for managing transactions on publications.
#[async_trait]
pub trait TxManager {
    /// Create a new publication and return its id.
    async fn create(&mut self, data: &NewPublication, created_at: &str) -> anyhow::Result<i64>;
    /// Find a publication by id.
    async fn find_by_id(&mut self, id: i64) -> anyhow::Result<Option<Publication>>;
    /// Take the write lock on a publication row.
    /// Returns `false` if the publication does not exist.
    async fn lock(&mut self, id: i64) -> anyhow::Result<bool>;
    /// Delete a publication by id. Returns the number of deleted rows.
    async fn delete_by_id(&mut self, id: i64) -> anyhow::Result<u64>;
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for a publication.
pub struct Publication {
    /// Unique identifier of the publication.
    pub id: i64,
    /// Title of the publication.
    pub title: String,
    /// Short description shown in listings.
    pub description: String,
    /// Body of the publication.
    pub content: String,
    /// Foreign key reference to city id.
    pub city_id: i64,
    /// Foreign key reference to `publication_type` id.
    pub publication_type_id: i64,
    /// Foreign key reference to the authoring user id.
    pub user_id: i64,
    /// Optional external link the publication refers to.
    pub reference_link: Option<String>,
    /// Creation timestamp in RFC 3339 format. Display only.
    pub created_at: String,
}

/// `Option` columns are decoded with `.ok()`: the sqlx 0.7 `Any` driver
/// cannot decode SQL `NULL` into `Option<T>`.
impl FromRow<'_, AnyRow> for Publication {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            content: row.try_get("content")?,
            city_id: row.try_get("city_id")?,
            publication_type_id: row.try_get("publication_type_id")?,
            user_id: row.try_get("user_id")?,
            reference_link: row.try_get("reference_link").ok(),
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Data needed to insert a new publication.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewPublication {
    /// Title of the publication.
    pub title: String,
    /// Short description shown in listings.
    pub description: String,
    /// Body of the publication.
    pub content: String,
    /// Foreign key reference to city id.
    pub city_id: i64,
    /// Foreign key reference to `publication_type` id.
    pub publication_type_id: i64,
    /// Authoring user id.
    pub user_id: i64,
    /// Optional external link.
    pub reference_link: Option<String>,
}

/// Public view of the authoring user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// User id.
    pub id: i64,
    /// Username.
    pub username: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Profile image, if any.
    pub image_url: Option<String>,
}

/// A publication as listed: the row, its author and its live vote count.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PublicationSummary {
    /// The publication row.
    #[serde(flatten)]
    pub publication: Publication,
    /// Author summary.
    pub user: Author,
    /// Number of votes, computed at read time.
    pub votes_count: i64,
}

impl FromRow<'_, AnyRow> for PublicationSummary {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        let publication = Publication::from_row(row)?;
        Ok(Self {
            user: Author {
                id: publication.user_id,
                username: row.try_get("author_username")?,
                first_name: row.try_get("author_first_name")?,
                last_name: row.try_get("author_last_name")?,
                image_url: row.try_get("author_image_url").ok(),
            },
            votes_count: row.try_get("votes_count")?,
            publication,
        })
    }
}

/// An `id`/`name` pair for reference tables such as city and publication type.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// A publication summary joined with its city and publication type.
#[derive(Debug, Clone)]
pub struct DetailRow {
    /// Publication, author and vote count.
    pub summary: PublicationSummary,
    /// City of the publication.
    pub city: Reference,
    /// Type of the publication.
    pub publication_type: Reference,
}

impl FromRow<'_, AnyRow> for DetailRow {
    fn from_row(row: &AnyRow) -> anyhow::Result<Self, sqlx::Error> {
        let summary = PublicationSummary::from_row(row)?;
        Ok(Self {
            city: Reference {
                id: summary.publication.city_id,
                name: row.try_get("city_name")?,
            },
            publication_type: Reference {
                id: summary.publication.publication_type_id,
                name: row.try_get("publication_type_name")?,
            },
            summary,
        })
    }
}

/// Filters and pagination for listing publications.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Only publications carrying this tag.
    pub tag_id: Option<i64>,
    /// Only publications of this type.
    pub publication_type_id: Option<i64>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Case-insensitive substring of the content.
    pub content: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
    /// Maximum number of rows to return.
    pub limit: i64,
    /// Number of rows to skip.
    pub offset: i64,
}
