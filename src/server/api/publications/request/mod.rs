use serde::Deserialize;

/// Query string of the publication listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number, from 0.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
    /// Only publications carrying this tag.
    pub tag_id: Option<i64>,
    /// Only publications of this type.
    pub publication_type_id: Option<i64>,
    /// Title substring.
    pub title: Option<String>,
    /// Content substring.
    pub content: Option<String>,
    /// Description substring.
    pub description: Option<String>,
}

/// Body of a publication creation request.
#[derive(Debug, Deserialize)]
pub struct NewPublicationBody {
    /// Title of the publication.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Body text.
    pub content: String,
    /// City id.
    pub city_id: i64,
    /// Publication type id.
    pub publication_type_id: i64,
    /// Optional external link.
    pub reference_link: Option<String>,
    /// Ids of the tags to attach.
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Path of an image resource.
#[derive(Debug, Deserialize)]
pub struct ImagePath {
    /// Publication id.
    pub id: i64,
    /// Image position.
    pub order: i64,
}
