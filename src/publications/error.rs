//! Errors surfaced by the publications core.
use derive_more::Display;

/// Failure of a publications operation.
#[derive(Debug, Display)]
pub enum PublicationError {
    /// The referenced publication does not exist.
    #[display(fmt = "Publication {} not found", _0)]
    NotFound(i64),
    /// The referenced image does not exist.
    #[display(fmt = "Image {} of publication {} not found", order, publication_id)]
    ImageNotFound {
        /// Publication id.
        publication_id: i64,
        /// Image position.
        order: i64,
    },
    /// No stored object under the key.
    #[display(fmt = "Object '{}' not found", _0)]
    ObjectNotFound(String),
    /// None of the supplied tag ids exist.
    #[display(fmt = "None of the tags {:?} exist", _0)]
    InvalidReference(Vec<i64>),
    /// The request carried malformed data.
    #[display(fmt = "Invalid input: {}", _0)]
    InvalidInput(String),
    /// The signed object URL is expired or forged.
    #[display(fmt = "Invalid or expired signature")]
    InvalidSignature,
    /// The relational store failed. The enclosing transaction was rolled back.
    #[display(fmt = "Storage failure: {:#}", _0)]
    StorageFailure(anyhow::Error),
    /// The object store failed.
    #[display(fmt = "Object store failure: {:#}", _0)]
    ObjectStoreFailure(anyhow::Error),
}

impl std::error::Error for PublicationError {}

impl From<anyhow::Error> for PublicationError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageFailure(err)
    }
}
