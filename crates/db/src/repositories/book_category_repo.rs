//! Repository for the `book_categories` association table.

use biblio_core::catalog::model::{BookCategory, NewBookCategory};
use biblio_core::types::{DbId, Timestamp};
use sqlx::PgPool;

const COLUMNS: &str = "id, book_id, category_id, priority, added_at, comment";

pub struct BookCategoryRepo;

impl BookCategoryRepo {
    /// Insert a batch of associations in one statement inside an open
    /// transaction. An empty batch issues no query.
    pub async fn create_batch_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        links: &[NewBookCategory],
    ) -> Result<Vec<BookCategory>, sqlx::Error> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let book_ids: Vec<DbId> = links.iter().map(|l| l.book_id).collect();
        let category_ids: Vec<DbId> = links.iter().map(|l| l.category_id).collect();
        let priorities: Vec<i32> = links.iter().map(|l| l.priority).collect();
        let added_at: Vec<Timestamp> = links.iter().map(|l| l.added_at).collect();
        let comments: Vec<Option<String>> = links.iter().map(|l| l.comment.clone()).collect();

        let query = format!(
            "INSERT INTO book_categories (book_id, category_id, priority, added_at, comment) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[], $4::timestamptz[], $5::text[]) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookCategory>(&query)
            .bind(&book_ids)
            .bind(&category_ids)
            .bind(&priorities)
            .bind(&added_at)
            .bind(&comments)
            .fetch_all(&mut **tx)
            .await
    }

    /// Associations of one book in insertion order.
    pub async fn list_by_book(pool: &PgPool, book_id: DbId) -> Result<Vec<BookCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM book_categories WHERE book_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, BookCategory>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }

    /// Associations of several books at once, grouped by book.
    pub async fn list_by_books(
        pool: &PgPool,
        book_ids: &[DbId],
    ) -> Result<Vec<BookCategory>, sqlx::Error> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM book_categories
             WHERE book_id = ANY($1)
             ORDER BY book_id, id"
        );
        sqlx::query_as::<_, BookCategory>(&query)
            .bind(book_ids)
            .fetch_all(pool)
            .await
    }
}
