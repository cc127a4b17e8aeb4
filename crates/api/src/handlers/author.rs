//! Handlers for the `/authors` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use biblio_core::catalog::model::{Author, AuthorPatch, NewAuthor};
use biblio_core::catalog::update::{patch_author, replace_author};
use biblio_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Author";

/// Query parameters for `GET /authors/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub text: String,
}

/// Query parameters for `GET /authors/count`.
#[derive(Debug, Deserialize)]
pub struct CountParams {
    pub nationality: String,
}

/// GET /api/v1/authors
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.store.list_authors().await?;
    Ok(Json(authors))
}

/// POST /api/v1/authors
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<NewAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.store.create_author(&input).await?;
    tracing::info!(author_id = author.id, user_id = admin.user_id, "Author created");
    Ok((StatusCode::CREATED, Json(author)))
}

/// GET /api/v1/authors/search?text=
///
/// Authors whose name contains `text`, ignoring case. Blank text is a 400.
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Author>>> {
    if params.text.trim().is_empty() {
        return Err(AppError::BadRequest("search text must not be blank".into()));
    }
    let authors = state.store.search_authors(&params.text).await?;
    Ok(Json(authors))
}

/// GET /api/v1/authors/count?nationality=
pub async fn count_by_nationality(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<CountParams>,
) -> AppResult<Json<DataResponse<i64>>> {
    let count = state
        .store
        .count_authors_by_nationality(&params.nationality)
        .await?;
    Ok(Json(DataResponse { data: count }))
}

/// GET /api/v1/authors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<Author>> {
    let author = state
        .store
        .find_author(id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(author))
}

/// PUT /api/v1/authors/{id}
///
/// Full replace: a missing or null `nacionalidad` clears the stored value.
pub async fn replace(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<NewAuthor>,
) -> AppResult<Json<Author>> {
    let author = replace_author(state.store.as_ref(), id, input)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(author))
}

/// PATCH /api/v1/authors/{id}
///
/// Partial merge: only fields carrying a non-null value are applied.
pub async fn patch(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<AuthorPatch>,
) -> AppResult<Json<Author>> {
    let author = patch_author(state.store.as_ref(), id, input)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(author))
}

/// DELETE /api/v1/authors/{id}
///
/// 409 while books still reference the author.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.store.delete_author(id).await? {
        tracing::info!(author_id = id, user_id = admin.user_id, "Author deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(ENTITY, id))
    }
}
