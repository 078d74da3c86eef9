//! API endpoint for fetching stored objects through signed URLs.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::state::{App as AppState, Global as _};
use crate::server::errors::HTTPError;

/// Signature parameters of an object URL.
#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    /// Expiry, unix seconds.
    pub expires: i64,
    /// Signature over key and expiry.
    pub signature: String,
}

/// Return the bytes stored under `{key}` if the URL signature is valid.
#[tracing::instrument(name = "Retrieving a stored object", skip(query, data))]
pub async fn get_file(
    path: web::Path<String>,
    query: web::Query<SignedQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let key = path.into_inner();
    let object = data
        .publications()
        .images()
        .open(&key, query.expires, &query.signature)
        .await?;
    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .body(object.bytes))
}
