//! Serve the publications API.
#![allow(clippy::exit, clippy::module_name_repetitions)]
use crate::config::Config;
use crate::db;
use crate::publications::Publications;
use crate::server::api::state::App as AppState;
use crate::server::tracing::AgoraRootSpanBuilder;
use crate::storage;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer};
use tracing_actix_web::TracingLogger;

use std::{io, process};

use actix_http::body::MessageBody;
use actix_service::ServiceFactory;

use crate::server::api::routes;

/// Build the application state from configuration.
///
/// # Errors
/// Errors if the database or the object store cannot be opened.
pub async fn init_state(config: &Config) -> anyhow::Result<AppState> {
    let db = db::init::connect(&config.database.url).await?;
    let store = storage::from_config(&config.storage)?;
    Ok(AppState {
        publications: Publications::new(db, store),
        default_page_size: config.pagination.default_size,
    })
}

/// Serve the publications API.
#[actix_web::main]
pub async fn serve(config: Config) -> io::Result<()> {
    let bind = config.server.bind.clone();
    let port = config.server.port;

    let state = match init_state(&config).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(
                "error: could not initialize application. Confirm that DATABASE_URL and the storage settings are correct."
            );
            tracing::error!("Error: {:?}", err);
            process::exit(1);
        }
    };
    tracing::info!("Running publications API on http://{bind}:{port}.");

    HttpServer::new(move || init_app(&state))
        .bind((bind.as_str(), port))?
        .run()
        .await
}

/// Initialize the application and all routing.
///
/// # Arguments
/// * `state` - The application state
pub fn init_app(
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
> {
    let app = App::new().wrap(TracingLogger::<AgoraRootSpanBuilder>::new());
    routes::register_app(app, state)
}
