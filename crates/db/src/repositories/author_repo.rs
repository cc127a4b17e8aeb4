//! Repository for the `authors` table.

use biblio_core::catalog::model::{Author, NewAuthor};
use biblio_core::types::DbId;
use sqlx::PgPool;

use crate::contains_pattern;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, nationality";

/// Provides CRUD and search operations for authors.
pub struct AuthorRepo;

impl AuthorRepo {
    /// Insert a new author, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAuthor) -> Result<Author, sqlx::Error> {
        let query = format!(
            "INSERT INTO authors (name, nationality)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(&input.name)
            .bind(&input.nationality)
            .fetch_one(pool)
            .await
    }

    /// Find an author by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List all authors ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors ORDER BY id");
        sqlx::query_as::<_, Author>(&query).fetch_all(pool).await
    }

    /// Authors whose name contains `text`, case-insensitively. Wildcards in
    /// `text` match literally.
    pub async fn search_by_name(pool: &PgPool, text: &str) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM authors
             WHERE name ILIKE $1 ESCAPE '\\'
             ORDER BY id"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(contains_pattern(text))
            .fetch_all(pool)
            .await
    }

    /// Number of authors with exactly this nationality.
    pub async fn count_by_nationality(pool: &PgPool, nationality: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM authors WHERE nationality = $1")
            .bind(nationality)
            .fetch_one(pool)
            .await
    }

    /// Overwrite every mutable column. Returns `None` if no row with the
    /// author's `id` exists.
    pub async fn update(pool: &PgPool, author: &Author) -> Result<Option<Author>, sqlx::Error> {
        let query = format!(
            "UPDATE authors SET name = $2, nationality = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(author.id)
            .bind(&author.name)
            .bind(&author.nationality)
            .fetch_optional(pool)
            .await
    }

    /// Delete an author by ID. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign key violation while books reference the author.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
