//! Persistence contract consumed by the catalog operations.
//!
//! The traits are object safe so the API can hold an
//! `Arc<dyn CatalogStore>` and swap the Postgres store for the in-process
//! one. Every failure surfaces as a [`CoreError`]; stores translate their
//! driver errors into [`CoreError::Storage`] (or [`CoreError::Conflict`]
//! for constraint violations) before returning.

use async_trait::async_trait;

use crate::catalog::model::{
    Author, Book, BookCategory, BookFilter, Category, NewAuthor, NewBook, NewBookCategory,
};
use crate::error::CoreError;
use crate::types::DbId;

/// Existence probes used by the validation gate.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn author_exists(&self, id: DbId) -> Result<bool, CoreError>;

    async fn category_exists(&self, id: DbId) -> Result<bool, CoreError>;
}

/// Key-based storage for authors, books, categories and their associations.
#[async_trait]
pub trait CatalogStore: ReferenceLookup {
    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), CoreError>;

    // -- Authors -------------------------------------------------------------

    async fn list_authors(&self) -> Result<Vec<Author>, CoreError>;

    async fn find_author(&self, id: DbId) -> Result<Option<Author>, CoreError>;

    /// Authors whose name contains `text`, ignoring case.
    async fn search_authors(&self, text: &str) -> Result<Vec<Author>, CoreError>;

    async fn count_authors_by_nationality(&self, nationality: &str) -> Result<i64, CoreError>;

    async fn create_author(&self, input: &NewAuthor) -> Result<Author, CoreError>;

    /// Write every mutable column of `author`. `None` if the row is gone.
    async fn save_author(&self, author: &Author) -> Result<Option<Author>, CoreError>;

    /// Returns `false` if no row matched. Fails with `Conflict` while books
    /// still reference the author.
    async fn delete_author(&self, id: DbId) -> Result<bool, CoreError>;

    // -- Books ---------------------------------------------------------------

    /// Books matching `filter`, each with its associations attached.
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, CoreError>;

    async fn find_book(&self, id: DbId) -> Result<Option<Book>, CoreError>;

    /// Write every mutable column of `book`; associations are not touched.
    /// Returns the stored book with its associations, `None` if the row is gone.
    async fn save_book(&self, book: &Book) -> Result<Option<Book>, CoreError>;

    // -- Categories ----------------------------------------------------------

    async fn list_categories(&self) -> Result<Vec<Category>, CoreError>;

    async fn find_category(&self, id: DbId) -> Result<Option<Category>, CoreError>;

    // -- Transactions --------------------------------------------------------

    /// Open a write scope. Dropping the returned handle without calling
    /// [`CatalogTx::commit`] discards every write made through it.
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, CoreError>;
}

/// Writes performed atomically by the book creation orchestrator.
#[async_trait]
pub trait CatalogTx: Send {
    /// Insert a book and return it with its generated identity.
    async fn insert_book(&mut self, input: &NewBook) -> Result<Book, CoreError>;

    /// Insert the whole batch. An empty batch is a no-op.
    async fn insert_book_categories(
        &mut self,
        links: &[NewBookCategory],
    ) -> Result<Vec<BookCategory>, CoreError>;

    async fn commit(self: Box<Self>) -> Result<(), CoreError>;
}
