//! A central place to register App routes.
use actix_service::ServiceFactory;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    web, App, Error,
};

use super::files::get_file;
use super::publications::{add_image, create, delete, get, list, remove_image, vote};
use super::state::App as AppState;

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[expect(
    clippy::literal_string_with_formatting_args,
    reason = "Actix Web resource path uses `{param}` syntax which is not formatting but route pattern matching"
)]
/// Central place to register all the App routing.
#[tracing::instrument(skip(app, state))]
pub fn register_app<
    U: MessageBody,
    V: ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<U>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
>(
    app: App<V>,
    state: &AppState,
) -> App<V> {
    app.app_data(web::Data::new(state.clone()))
        .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))
        .service(
            web::scope("/publications")
                .service(
                    web::resource("")
                        .route(web::get().to(list))
                        .route(web::post().to(create)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(get))
                        .route(web::delete().to(delete)),
                )
                .service(web::resource("/{id}/vote").route(web::post().to(vote)))
                .service(web::resource("/{id}/images").route(web::post().to(add_image)))
                .service(
                    web::resource("/{id}/images/{order}").route(web::delete().to(remove_image)),
                ),
        )
        .service(web::resource("/files/{key:.*}").route(web::get().to(get_file)))
}
