//! Repository for the `books` table.
//!
//! Rows come back with an empty `categories` list; the store attaches
//! associations from [`super::BookCategoryRepo`].

use biblio_core::catalog::model::{Book, BookFilter, NewBook};
use biblio_core::types::DbId;
use sqlx::PgPool;

use crate::contains_pattern;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, publication_year, author_id";

pub struct BookRepo;

impl BookRepo {
    /// Insert a book inside an open transaction, returning the created row.
    pub async fn create_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewBook,
    ) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (title, publication_year, author_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(input.publication_year)
            .bind(input.author_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List books ordered by ID. Unset filter fields match every row.
    pub async fn list(pool: &PgPool, filter: &BookFilter) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books
             WHERE ($1::TEXT IS NULL OR title LIKE $1 ESCAPE '\\')
               AND ($2::INTEGER IS NULL OR publication_year = $2)
               AND ($3::BIGINT IS NULL OR author_id = $3)
             ORDER BY id"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(filter.title.as_deref().map(contains_pattern))
            .bind(filter.year)
            .bind(filter.author_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every mutable column. Returns `None` if no row with the
    /// book's `id` exists.
    pub async fn update(pool: &PgPool, book: &Book) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET title = $2, publication_year = $3, author_id = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(book.id)
            .bind(&book.title)
            .bind(book.publication_year)
            .bind(book.author_id)
            .fetch_optional(pool)
            .await
    }
}
