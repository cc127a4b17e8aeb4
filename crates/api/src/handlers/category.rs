//! Handlers for the read-only `/categories` resource.

use axum::extract::{Path, State};
use axum::Json;
use biblio_core::catalog::model::Category;
use biblio_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<Category>>> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<Category>> {
    let category = state
        .store
        .find_category(id)
        .await?
        .ok_or(AppError::not_found("Category", id))?;
    Ok(Json(category))
}
