//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Missing database configuration.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: SHOPQL_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Resolve the database URL the same way the API server does.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("SHOPQL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Open a small pool for a one-off command.
pub async fn connect(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.expose_secret())
        .await
}
