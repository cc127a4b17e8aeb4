//! Book creation orchestrator.
//!
//! Sequence:
//!
//! 1. Collapse identical category entries; the request carries a set.
//! 2. Reject when the author does not exist.
//! 3. Reject when any referenced category does not exist.
//! 4. Reject when a category is listed twice with different metadata.
//! 5. Inside one transaction: insert the book, build the association batch
//!    against the new book id, insert the batch, commit.
//!
//! Rejections in 2-4 are ordinary outcomes (`success == false`) and perform
//! no writes. A store failure in step 5 rolls the whole creation back and is
//! returned as an error, never as a success-shaped outcome.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::model::{Book, NewBook, NewBookCategory};
use crate::catalog::store::CatalogStore;
use crate::catalog::validation::{
    author_exists, categories_exist, find_duplicate_category, AUTHOR_MISSING, CATEGORIES_MISSING,
};
use crate::error::CoreError;
use crate::types::DbId;

/// One category assignment in a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct CategoryEntry {
    #[serde(rename = "categoria")]
    pub category_id: DbId,
    #[serde(rename = "prioridad")]
    pub priority: i32,
    #[serde(rename = "comentario")]
    pub comment: Option<String>,
}

impl CategoryEntry {
    fn into_link(self, book_id: DbId) -> NewBookCategory {
        NewBookCategory {
            book_id,
            category_id: self.category_id,
            priority: self.priority,
            comment: self.comment,
            added_at: Utc::now(),
        }
    }
}

/// Book creation request.
///
/// `isbn`, `numPaginas` and `idioma` belong to the book detail record, which
/// this service does not persist. They are accepted so existing clients keep
/// working.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "anioPublicacion")]
    pub publication_year: Option<i32>,
    #[serde(rename = "autor")]
    pub author_id: DbId,
    pub isbn: Option<String>,
    #[serde(rename = "numPaginas")]
    pub page_count: Option<i32>,
    #[serde(rename = "idioma")]
    pub language: Option<String>,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<CategoryEntry>,
}

/// Result of a creation attempt. Serializes to `{exitoso, mensajeError}`;
/// the created book stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBookOutcome {
    #[serde(rename = "exitoso")]
    pub success: bool,
    #[serde(rename = "mensajeError")]
    pub error_message: Option<String>,
    #[serde(skip)]
    pub book: Option<Book>,
}

impl CreateBookOutcome {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            book: None,
        }
    }

    pub fn created(book: Book) -> Self {
        Self {
            success: true,
            error_message: None,
            book: Some(book),
        }
    }
}

/// Validate and persist a book with its category associations.
pub async fn create_book<S>(
    store: &S,
    request: CreateBookRequest,
) -> Result<CreateBookOutcome, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let CreateBookRequest {
        title,
        publication_year,
        author_id,
        categories,
        ..
    } = request;
    let categories = distinct_entries(categories);

    if !author_exists(store, author_id).await? {
        tracing::info!(author_id, "Book rejected: author does not exist");
        return Ok(CreateBookOutcome::rejected(AUTHOR_MISSING));
    }

    let category_ids: Vec<DbId> = categories.iter().map(|c| c.category_id).collect();
    if !categories_exist(store, &category_ids).await? {
        tracing::info!(?category_ids, "Book rejected: unknown category");
        return Ok(CreateBookOutcome::rejected(CATEGORIES_MISSING));
    }
    if let Some(duplicate) = find_duplicate_category(&category_ids) {
        tracing::info!(category_id = duplicate, "Book rejected: duplicate category");
        return Ok(CreateBookOutcome::rejected(format!(
            "category {duplicate} is listed more than once with different priority or comment"
        )));
    }

    let new_book = NewBook {
        title,
        publication_year,
        author_id,
    };
    let book = persist(store, &new_book, categories)
        .await
        .inspect_err(|e| tracing::error!(error = %e, author_id, "Book creation rolled back"))?;

    tracing::info!(
        book_id = book.id,
        author_id,
        categories = book.categories.len(),
        "Book created"
    );
    Ok(CreateBookOutcome::created(book))
}

/// Drop entries identical to an earlier one, keeping first-seen order.
fn distinct_entries(entries: Vec<CategoryEntry>) -> Vec<CategoryEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

/// Transactional part of the creation. Any early return drops the
/// transaction, which rolls back the book insert.
async fn persist<S>(
    store: &S,
    new_book: &NewBook,
    categories: Vec<CategoryEntry>,
) -> Result<Book, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let mut tx = store.begin().await?;
    let mut book = tx.insert_book(new_book).await?;

    let links: Vec<NewBookCategory> = categories
        .into_iter()
        .map(|entry| entry.into_link(book.id))
        .collect();
    book.categories = tx.insert_book_categories(&links).await?;

    tx.commit().await?;
    Ok(book)
}
