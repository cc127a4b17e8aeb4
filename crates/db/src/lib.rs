//! PostgreSQL persistence for the library catalog.
//!
//! - [`repositories`] -- zero-sized repos with one async method per query.
//! - [`store::PgCatalogStore`] -- the [`biblio_core::catalog::store::CatalogStore`]
//!   implementation the API runs against.

use biblio_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub mod repositories;
pub mod store;

pub use store::PgCatalogStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Translate a sqlx error into the domain error the core understands.
///
/// - Unique violations (`23505`) on `uq_` constraints and foreign key
///   violations (`23503`) become [`CoreError::Conflict`].
/// - Everything else becomes [`CoreError::Storage`].
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    ));
                }
            }
            Some("23503") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Conflict(format!(
                    "Operation violates foreign key constraint: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

/// Build a `LIKE` pattern matching `text` anywhere, with `%`, `_` and `\`
/// escaped. Use together with `ESCAPE '\'`.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
