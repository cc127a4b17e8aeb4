//! In-process [`CatalogStore`] used by tests and by local runs without a
//! database (`CATALOG_STORE=memory`).
//!
//! Mirrors the Postgres store's observable behaviour: identities come from
//! per-table sequences that are consumed even when a transaction rolls
//! back, the `(book_id, category_id)` pair is unique, and deleting an author
//! still referenced by a book is a conflict. References are checked again at
//! commit, so a transaction whose author or category was deleted meanwhile
//! fails with [`CoreError::Conflict`] and writes nothing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::model::{
    Author, Book, BookCategory, BookFilter, Category, NewAuthor, NewBook, NewBookCategory,
};
use crate::catalog::store::{CatalogStore, CatalogTx, ReferenceLookup};
use crate::error::CoreError;
use crate::types::DbId;

/// Category names the database migration seeds. Local runs seed the same
/// set so book creation has something to reference.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "fiction",
    "science-fiction",
    "fantasy",
    "history",
    "poetry",
    "essay",
];

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<DbId, Author>,
    categories: BTreeMap<DbId, Category>,
    /// Stored without associations; those live in `links`.
    books: BTreeMap<DbId, Book>,
    links: BTreeMap<DbId, BookCategory>,
}

impl Tables {
    fn links_for(&self, book_id: DbId) -> Vec<BookCategory> {
        self.links
            .values()
            .filter(|l| l.book_id == book_id)
            .cloned()
            .collect()
    }

    fn with_links(&self, book: &Book) -> Book {
        Book {
            categories: self.links_for(book.id),
            ..book.clone()
        }
    }
}

#[derive(Debug, Default)]
struct Sequence(AtomicI64);

impl Sequence {
    fn next(&self) -> DbId {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: RwLock<Tables>,
    author_seq: Sequence,
    category_seq: Sequence,
    book_seq: Sequence,
    link_seq: Sequence,
    fail_link_batches: AtomicBool,
}

/// Cheaply cloneable handle to a shared in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    inner: Arc<Inner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category. Categories are reference data, so this lives
    /// outside the [`CatalogStore`] contract.
    pub async fn insert_category(&self, name: &str) -> Category {
        let category = Category {
            id: self.inner.category_seq.next(),
            name: name.to_string(),
        };
        self.inner
            .tables
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        category
    }

    /// Insert every name in [`DEFAULT_CATEGORIES`], in order.
    pub async fn seed_default_categories(&self) -> Vec<Category> {
        let mut seeded = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for name in DEFAULT_CATEGORIES {
            seeded.push(self.insert_category(name).await);
        }
        seeded
    }

    /// Make every subsequent association batch insert fail with
    /// [`CoreError::Storage`] until switched off again.
    pub fn fail_link_batches(&self, fail: bool) {
        self.inner.fail_link_batches.store(fail, Ordering::SeqCst);
    }

    /// Number of committed books.
    pub async fn book_count(&self) -> usize {
        self.inner.tables.read().await.books.len()
    }

    /// Number of committed book-category associations.
    pub async fn book_category_count(&self) -> usize {
        self.inner.tables.read().await.links.len()
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryCatalogStore {
    async fn author_exists(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.inner.tables.read().await.authors.contains_key(&id))
    }

    async fn category_exists(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.inner.tables.read().await.categories.contains_key(&id))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn list_authors(&self) -> Result<Vec<Author>, CoreError> {
        Ok(self.inner.tables.read().await.authors.values().cloned().collect())
    }

    async fn find_author(&self, id: DbId) -> Result<Option<Author>, CoreError> {
        Ok(self.inner.tables.read().await.authors.get(&id).cloned())
    }

    async fn search_authors(&self, text: &str) -> Result<Vec<Author>, CoreError> {
        let needle = text.to_lowercase();
        Ok(self
            .inner
            .tables
            .read()
            .await
            .authors
            .values()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn count_authors_by_nationality(&self, nationality: &str) -> Result<i64, CoreError> {
        let count = self
            .inner
            .tables
            .read()
            .await
            .authors
            .values()
            .filter(|a| a.nationality.as_deref() == Some(nationality))
            .count();
        Ok(count as i64)
    }

    async fn create_author(&self, input: &NewAuthor) -> Result<Author, CoreError> {
        let author = Author {
            id: self.inner.author_seq.next(),
            name: input.name.clone(),
            nationality: input.nationality.clone(),
        };
        self.inner
            .tables
            .write()
            .await
            .authors
            .insert(author.id, author.clone());
        Ok(author)
    }

    async fn save_author(&self, author: &Author) -> Result<Option<Author>, CoreError> {
        let mut tables = self.inner.tables.write().await;
        match tables.authors.get_mut(&author.id) {
            Some(stored) => {
                *stored = author.clone();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_author(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.inner.tables.write().await;
        if tables.books.values().any(|b| b.author_id == id) {
            return Err(CoreError::Conflict(format!(
                "Author {id} is still referenced by one or more books"
            )));
        }
        Ok(tables.authors.remove(&id).is_some())
    }

    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, CoreError> {
        let tables = self.inner.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| filter.matches(b))
            .map(|b| tables.with_links(b))
            .collect())
    }

    async fn find_book(&self, id: DbId) -> Result<Option<Book>, CoreError> {
        let tables = self.inner.tables.read().await;
        Ok(tables.books.get(&id).map(|b| tables.with_links(b)))
    }

    async fn save_book(&self, book: &Book) -> Result<Option<Book>, CoreError> {
        let mut tables = self.inner.tables.write().await;
        if !tables.authors.contains_key(&book.author_id) {
            return Err(CoreError::Conflict(format!(
                "Author {} does not exist",
                book.author_id
            )));
        }
        match tables.books.get_mut(&book.id) {
            Some(stored) => {
                stored.title = book.title.clone();
                stored.publication_year = book.publication_year;
                stored.author_id = book.author_id;
                let stored = stored.clone();
                Ok(Some(tables.with_links(&stored)))
            }
            None => Ok(None),
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self
            .inner
            .tables
            .read()
            .await
            .categories
            .values()
            .cloned()
            .collect())
    }

    async fn find_category(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        Ok(self.inner.tables.read().await.categories.get(&id).cloned())
    }

    async fn begin(&self) -> Result<Box<dyn CatalogTx>, CoreError> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            books: Vec::new(),
            links: Vec::new(),
        }))
    }
}

/// Buffers writes until commit; dropping it discards them.
struct MemoryTx {
    store: InMemoryCatalogStore,
    books: Vec<Book>,
    links: Vec<BookCategory>,
}

#[async_trait]
impl CatalogTx for MemoryTx {
    async fn insert_book(&mut self, input: &NewBook) -> Result<Book, CoreError> {
        let book = Book {
            id: self.store.inner.book_seq.next(),
            title: input.title.clone(),
            publication_year: input.publication_year,
            author_id: input.author_id,
            categories: Vec::new(),
        };
        self.books.push(book.clone());
        Ok(book)
    }

    async fn insert_book_categories(
        &mut self,
        links: &[NewBookCategory],
    ) -> Result<Vec<BookCategory>, CoreError> {
        if links.is_empty() {
            return Ok(Vec::new());
        }
        if self.store.inner.fail_link_batches.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(
                "book_categories batch insert failed".into(),
            ));
        }

        let tables = self.store.inner.tables.read().await;
        let mut inserted = Vec::with_capacity(links.len());
        for link in links {
            let taken = tables
                .links
                .values()
                .chain(self.links.iter())
                .chain(inserted.iter())
                .any(|l: &BookCategory| {
                    l.book_id == link.book_id && l.category_id == link.category_id
                });
            if taken {
                return Err(CoreError::Conflict(format!(
                    "Book {} is already linked to category {}",
                    link.book_id, link.category_id
                )));
            }
            inserted.push(BookCategory {
                id: self.store.inner.link_seq.next(),
                book_id: link.book_id,
                category_id: link.category_id,
                priority: link.priority,
                added_at: link.added_at,
                comment: link.comment.clone(),
            });
        }
        drop(tables);

        self.links.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        let MemoryTx {
            store,
            books,
            links,
        } = *self;
        let mut tables = store.inner.tables.write().await;
        if let Some(book) = books
            .iter()
            .find(|b| !tables.authors.contains_key(&b.author_id))
        {
            return Err(CoreError::Conflict(format!(
                "Author {} no longer exists",
                book.author_id
            )));
        }
        for link in &links {
            if !tables.categories.contains_key(&link.category_id) {
                return Err(CoreError::Conflict(format!(
                    "Category {} no longer exists",
                    link.category_id
                )));
            }
            let taken = tables
                .links
                .values()
                .any(|l| l.book_id == link.book_id && l.category_id == link.category_id);
            if taken {
                return Err(CoreError::Conflict(format!(
                    "Book {} is already linked to category {}",
                    link.book_id, link.category_id
                )));
            }
        }
        for book in books {
            tables.books.insert(book.id, book);
        }
        for link in links {
            tables.links.insert(link.id, link);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn new_author(name: &str) -> NewAuthor {
        NewAuthor {
            name: name.to_string(),
            nationality: None,
        }
    }

    fn new_book(author_id: DbId) -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            publication_year: Some(1965),
            author_id,
        }
    }

    fn link(book_id: DbId, category_id: DbId) -> NewBookCategory {
        NewBookCategory {
            book_id,
            category_id,
            priority: 1,
            comment: None,
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let store = InMemoryCatalogStore::new();
        let author = store.create_author(&new_author("Frank Herbert")).await.unwrap();
        let category = store.insert_category("sci-fi").await;

        let mut tx = store.begin().await.unwrap();
        let book = tx.insert_book(&new_book(author.id)).await.unwrap();
        tx.insert_book_categories(&[link(book.id, category.id)])
            .await
            .unwrap();
        assert_eq!(store.book_count().await, 0);
        tx.commit().await.unwrap();

        let loaded = store.find_book(book.id).await.unwrap().unwrap();
        assert_eq!(loaded.categories.len(), 1);
        assert_eq!(loaded.categories[0].category_id, category.id);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryCatalogStore::new();
        let author = store.create_author(&new_author("A")).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_book(&new_book(author.id)).await.unwrap();
        }

        assert_eq!(store.book_count().await, 0);
        assert_eq!(store.book_category_count().await, 0);
    }

    #[tokio::test]
    async fn commit_fails_when_author_was_deleted_meanwhile() {
        let store = InMemoryCatalogStore::new();
        let author = store.create_author(&new_author("Frank Herbert")).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        tx.insert_book(&new_book(author.id)).await.unwrap();

        assert!(store.delete_author(author.id).await.unwrap());
        let result = tx.commit().await;

        assert_matches!(result, Err(CoreError::Conflict(_)));
        assert_eq!(store.book_count().await, 0);
    }

    #[tokio::test]
    async fn duplicate_link_in_batch_conflicts() {
        let store = InMemoryCatalogStore::new();
        let author = store.create_author(&new_author("A")).await.unwrap();
        let category = store.insert_category("poetry").await;

        let mut tx = store.begin().await.unwrap();
        let book = tx.insert_book(&new_book(author.id)).await.unwrap();
        let result = tx
            .insert_book_categories(&[link(book.id, category.id), link(book.id, category.id)])
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn injected_batch_failure_is_a_storage_error() {
        let store = InMemoryCatalogStore::new();
        store.fail_link_batches(true);

        let mut tx = store.begin().await.unwrap();
        let result = tx.insert_book_categories(&[link(1, 1)]).await;
        assert_matches!(result, Err(CoreError::Storage(_)));

        let empty = tx.insert_book_categories(&[]).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let store = InMemoryCatalogStore::new();
        store.create_author(&new_author("Gabriel García Márquez")).await.unwrap();
        store.create_author(&new_author("Isabel Allende")).await.unwrap();

        let found = store.search_authors("GARCÍA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Gabriel García Márquez");
    }

    #[tokio::test]
    async fn count_by_nationality_is_exact() {
        let store = InMemoryCatalogStore::new();
        for (name, nationality) in [("A", "CO"), ("B", "CO"), ("C", "CL")] {
            store
                .create_author(&NewAuthor {
                    name: name.into(),
                    nationality: Some(nationality.into()),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.count_authors_by_nationality("CO").await.unwrap(), 2);
        assert_eq!(store.count_authors_by_nationality("co").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn referenced_author_cannot_be_deleted() {
        let store = InMemoryCatalogStore::new();
        let author = store.create_author(&new_author("A")).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        tx.insert_book(&new_book(author.id)).await.unwrap();
        tx.commit().await.unwrap();

        assert_matches!(
            store.delete_author(author.id).await,
            Err(CoreError::Conflict(_))
        );
        assert!(!store.delete_author(999).await.unwrap());
    }

    #[tokio::test]
    async fn save_missing_author_returns_none() {
        let store = InMemoryCatalogStore::new();
        let ghost = Author {
            id: 42,
            name: "Nobody".into(),
            nationality: None,
        };
        assert_eq!(store.save_author(&ghost).await.unwrap(), None);
    }

    #[tokio::test]
    async fn default_categories_are_seeded_in_order() {
        let store = InMemoryCatalogStore::new();
        let seeded = store.seed_default_categories().await;

        assert_eq!(seeded.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(seeded[1].name, "science-fiction");
        assert_eq!(store.list_categories().await.unwrap(), seeded);
    }
}
