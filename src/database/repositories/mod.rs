// PostgreSQL implementations of the storage traits.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod note;
pub mod user;

pub use note::NoteRepository;
pub use user::UserRepository;

use super::StoreError;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Unique-constraint violations become `Conflict`; everything else passes through.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(message())
        }
        _ => StoreError::Database(err),
    }
}
