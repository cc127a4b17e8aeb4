//! Handlers for the `/books` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use biblio_core::catalog::creation::{create_book, CreateBookOutcome, CreateBookRequest};
use biblio_core::catalog::model::{Book, BookFilter, BookPatch, BookReplacement};
use biblio_core::catalog::update::{patch_book, replace_book};
use biblio_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

const ENTITY: &str = "Book";

/// GET /api/v1/books?title=&year=&author=
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<BookFilter>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.store.list_books(&filter).await?;
    Ok(Json(books))
}

/// POST /api/v1/books
///
/// Always 200 with `{exitoso, mensajeError}` once the request parses;
/// referential failures are reported in the body. Storage failures are 500.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateBookRequest>,
) -> AppResult<Json<CreateBookOutcome>> {
    tracing::debug!(user_id = admin.user_id, author_id = input.author_id, "Creating book");
    let outcome = create_book(state.store.as_ref(), input).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/books/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<Book>> {
    let book = state
        .store
        .find_book(id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(book))
}

/// PUT /api/v1/books/{id}
pub async fn replace(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<BookReplacement>,
) -> AppResult<Json<Book>> {
    let book = replace_book(state.store.as_ref(), id, input)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(book))
}

/// PATCH /api/v1/books/{id}
pub async fn patch(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<BookPatch>,
) -> AppResult<Json<Book>> {
    let book = patch_book(state.store.as_ref(), id, input)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(book))
}
