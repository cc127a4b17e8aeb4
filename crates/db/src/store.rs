//! [`CatalogStore`] backed by PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use biblio_core::catalog::model::{
    Author, Book, BookCategory, BookFilter, Category, NewAuthor, NewBook, NewBookCategory,
};
use biblio_core::catalog::store::{CatalogStore, CatalogTx, ReferenceLookup};
use biblio_core::error::CoreError;
use biblio_core::types::DbId;

use crate::repositories::{AuthorRepo, BookCategoryRepo, BookRepo, CategoryRepo};
use crate::{health_check, map_db_error, DbPool};

/// Catalog store over a shared connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_links(&self, book: Book) -> Result<Book, CoreError> {
        let categories = BookCategoryRepo::list_by_book(&self.pool, book.id)
            .await
            .map_err(map_db_error)?;
        Ok(Book { categories, ..book })
    }
}

#[async_trait]
impl ReferenceLookup for PgCatalogStore {
    async fn author_exists(&self, id: DbId) -> Result<bool, CoreError> {
        AuthorRepo::exists(&self.pool, id).await.map_err(map_db_error)
    }

    async fn category_exists(&self, id: DbId) -> Result<bool, CoreError> {
        CategoryRepo::exists(&self.pool, id)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), CoreError> {
        health_check(&self.pool).await.map_err(map_db_error)
    }

    async fn list_authors(&self) -> Result<Vec<Author>, CoreError> {
        AuthorRepo::list(&self.pool).await.map_err(map_db_error)
    }

    async fn find_author(&self, id: DbId) -> Result<Option<Author>, CoreError> {
        AuthorRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)
    }

    async fn search_authors(&self, text: &str) -> Result<Vec<Author>, CoreError> {
        AuthorRepo::search_by_name(&self.pool, text)
            .await
            .map_err(map_db_error)
    }

    async fn count_authors_by_nationality(&self, nationality: &str) -> Result<i64, CoreError> {
        AuthorRepo::count_by_nationality(&self.pool, nationality)
            .await
            .map_err(map_db_error)
    }

    async fn create_author(&self, input: &NewAuthor) -> Result<Author, CoreError> {
        AuthorRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)
    }

    async fn save_author(&self, author: &Author) -> Result<Option<Author>, CoreError> {
        AuthorRepo::update(&self.pool, author)
            .await
            .map_err(map_db_error)
    }

    async fn delete_author(&self, id: DbId) -> Result<bool, CoreError> {
        AuthorRepo::delete(&self.pool, id)
            .await
            .map_err(map_db_error)
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, CoreError> {
        let books = BookRepo::list(&self.pool, filter)
            .await
            .map_err(map_db_error)?;
        let ids: Vec<DbId> = books.iter().map(|b| b.id).collect();
        let links = BookCategoryRepo::list_by_books(&self.pool, &ids)
            .await
            .map_err(map_db_error)?;

        let mut by_book: HashMap<DbId, Vec<BookCategory>> = HashMap::new();
        for link in links {
            by_book.entry(link.book_id).or_default().push(link);
        }

        Ok(books
            .into_iter()
            .map(|book| Book {
                categories: by_book.remove(&book.id).unwrap_or_default(),
                ..book
            })
            .collect())
    }

    async fn find_book(&self, id: DbId) -> Result<Option<Book>, CoreError> {
        let book = BookRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        match book {
            Some(book) => self.with_links(book).await.map(Some),
            None => Ok(None),
        }
    }

    async fn save_book(&self, book: &Book) -> Result<Option<Book>, CoreError> {
        let saved = BookRepo::update(&self.pool, book)
            .await
            .map_err(map_db_error)?;
        match saved {
            Some(saved) => self.with_links(saved).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        CategoryRepo::list(&self.pool).await.map_err(map_db_error)
    }

    async fn find_category(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)
    }

    async fn begin(&self) -> Result<Box<dyn CatalogTx>, CoreError> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgCatalogTx { tx }))
    }
}

/// Open database transaction. Rolled back by sqlx when dropped uncommitted.
pub struct PgCatalogTx {
    tx: sqlx::Transaction<'static, sqlx::Postgres>,
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
    async fn insert_book(&mut self, input: &NewBook) -> Result<Book, CoreError> {
        BookRepo::create_in_tx(&mut self.tx, input)
            .await
            .map_err(map_db_error)
    }

    async fn insert_book_categories(
        &mut self,
        links: &[NewBookCategory],
    ) -> Result<Vec<BookCategory>, CoreError> {
        BookCategoryRepo::create_batch_in_tx(&mut self.tx, links)
            .await
            .map_err(map_db_error)
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
