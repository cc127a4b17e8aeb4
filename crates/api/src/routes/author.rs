//! Route definitions for the `/authors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::author;
use crate::state::AppState;

/// Routes mounted at `/authors`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /search    -> search
/// GET    /count     -> count_by_nationality
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> replace
/// PATCH  /{id}      -> patch
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(author::list).post(author::create))
        .route("/search", get(author::search))
        .route("/count", get(author::count_by_nationality))
        .route(
            "/{id}",
            get(author::get_by_id)
                .put(author::replace)
                .patch(author::patch)
                .delete(author::delete),
        )
}
