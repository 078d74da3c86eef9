//! Handlers for publications, votes and publication images.
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::db::models::publication::{Filter, NewPublication};
use crate::server::errors::HTTPError;
use crate::utils::pagination::{Paged, Pagination};

use super::identity::Identity;
use super::state::{App as AppState, Global as _};

/// Module that maps the HTTP web request body to structs.
pub mod request;

/// Drop empty search strings so `?title=` does not filter.
fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty()).cloned()
}

/// List publications, paginated and filtered.
#[tracing::instrument(skip(data))]
pub async fn list(
    query: web::Query<request::ListQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let pagination = Pagination::new(query.page, query.size, data.default_page_size());
    let filter = Filter {
        tag_id: query.tag_id,
        publication_type_id: query.publication_type_id,
        title: non_empty(query.title.as_ref()),
        content: non_empty(query.content.as_ref()),
        description: non_empty(query.description.as_ref()),
        limit: pagination.limit,
        offset: pagination.offset,
    };
    let page = data.publications().find_many(&filter).await?;
    let results = Paged::new(page.rows, page.count, pagination);
    Ok(HttpResponse::Ok().json(json!({ "results": results })))
}

/// Get one publication with its details.
#[tracing::instrument(skip(data))]
pub async fn get(
    path: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let detail = data.publications().find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "results": detail })))
}

/// Create a publication authored by the caller.
#[tracing::instrument(skip(data, body))]
pub async fn create(
    identity: Identity,
    body: web::Json<request::NewPublicationBody>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let body = body.into_inner();
    let new_publication = NewPublication {
        title: body.title,
        description: body.description,
        content: body.content,
        city_id: body.city_id,
        publication_type_id: body.publication_type_id,
        user_id: identity.user_id,
        reference_link: body.reference_link,
    };
    let created = data
        .publications()
        .create(&new_publication, &body.tags)
        .await?;
    Ok(HttpResponse::Created().json(json!({ "results": created })))
}

/// Fail unless the caller owns publication `id` or is an administrator.
async fn authorize_owner(
    identity: &Identity,
    id: i64,
    data: &AppState,
) -> Result<(), HTTPError> {
    let owner_id = data.publications().owner_of(id).await?;
    if identity.is_owner_or_admin(owner_id) {
        Ok(())
    } else {
        tracing::warn!(user_id = identity.user_id, publication_id = id, "Refused non-owner");
        Err(HTTPError::Forbidden)
    }
}

/// Delete a publication and everything attached to it.
#[tracing::instrument(skip(data))]
pub async fn delete(
    identity: Identity,
    path: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let id = path.into_inner();
    authorize_owner(&identity, id, &data).await?;
    let deletion = data.publications().delete(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Publication deleted", "results": deletion })))
}

/// Toggle the caller's vote on a publication.
#[tracing::instrument(skip(data))]
pub async fn vote(
    identity: Identity,
    path: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let toggle = data
        .publications()
        .votes()
        .toggle(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": toggle.to_string(), "results": toggle })))
}

/// Upload an image to a publication. The request body is the raw image.
#[tracing::instrument(skip(req, body, data))]
pub async fn add_image(
    identity: Identity,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    let id = path.into_inner();
    authorize_owner(&identity, id, &data).await?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| HTTPError::BadRequest("Content-Type header required".to_owned()))?;
    let image = data
        .publications()
        .images()
        .add(id, body.to_vec(), content_type)
        .await?;
    Ok(HttpResponse::Created().json(json!({ "results": image })))
}

/// Remove one image of a publication.
#[tracing::instrument(skip(data))]
pub async fn remove_image(
    identity: Identity,
    path: web::Path<request::ImagePath>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, HTTPError> {
    authorize_owner(&identity, path.id, &data).await?;
    data.publications()
        .images()
        .remove(path.id, path.order)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Image removed" })))
}
