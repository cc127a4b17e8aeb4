//! Full replace and partial merge for authors and books.
//!
//! All four operations load the target by id first; an absent target yields
//! `Ok(None)` and nothing is written. Book updates that carry an author
//! reference re-run the same existence check as book creation.

use crate::catalog::model::{Author, AuthorPatch, Book, BookPatch, BookReplacement, NewAuthor};
use crate::catalog::store::CatalogStore;
use crate::catalog::validation::ensure_author_exists;
use crate::error::CoreError;
use crate::patch::Mergeable;
use crate::types::DbId;

/// Overwrite every mutable author field.
pub async fn replace_author<S>(
    store: &S,
    id: DbId,
    replacement: NewAuthor,
) -> Result<Option<Author>, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let Some(mut author) = store.find_author(id).await? else {
        return Ok(None);
    };
    author.replace_with(replacement);
    store.save_author(&author).await
}

/// Apply only the author fields the patch carries a value for.
pub async fn patch_author<S>(
    store: &S,
    id: DbId,
    patch: AuthorPatch,
) -> Result<Option<Author>, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let Some(mut author) = store.find_author(id).await? else {
        return Ok(None);
    };
    author.merge_patch(patch);
    store.save_author(&author).await
}

/// Overwrite every mutable book field. Associations are kept.
pub async fn replace_book<S>(
    store: &S,
    id: DbId,
    replacement: BookReplacement,
) -> Result<Option<Book>, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let Some(mut book) = store.find_book(id).await? else {
        return Ok(None);
    };
    ensure_author_exists(store, replacement.author_id).await?;
    book.replace_with(replacement);
    store.save_book(&book).await
}

/// Apply only the book fields the patch carries a value for.
pub async fn patch_book<S>(
    store: &S,
    id: DbId,
    patch: BookPatch,
) -> Result<Option<Book>, CoreError>
where
    S: CatalogStore + ?Sized,
{
    let Some(mut book) = store.find_book(id).await? else {
        return Ok(None);
    };
    if let Some(&author_id) = patch.author_id.as_value() {
        ensure_author_exists(store, author_id).await?;
    }
    book.merge_patch(patch);
    store.save_book(&book).await
}
