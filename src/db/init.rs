use crate::db::{DatabaseConnection, DatabaseKind, Db as _};
use std::env;

/// Connects to a database and applies migrations.
/// The URL comes from configuration, but we can override this by setting the `DATABASE_URL` environment variable.
///
/// # Errors
/// Errors if connection to database fails.
/// Connections can fail if the database file cannot be opened, or if the database URL is invalid.
pub async fn connect(configured_url: &str) -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| configured_url.to_owned());
    open(&db_url).await
}

/// Connects to the database at exactly `db_url` and applies migrations.
///
/// # Errors
/// Errors if the connection or any migration fails.
pub async fn open(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let connection = DatabaseConnection::connect(db_url).await?;
    tracing::info!("Connected to database");
    match connection.kind {
        DatabaseKind::Sqlite => {
            sqlx::migrate!("./migrations/sqlite")
                .run(&connection.pool)
                .await?;
        }
    }
    Ok(connection)
}
