pub mod author;
pub mod book;
pub mod category;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /authors                          list, create (admin)
/// /authors/search?text=             name contains, ignoring case
/// /authors/count?nationality=       count by nationality
/// /authors/{id}                     get, replace (admin), patch, delete (admin)
///
/// /books?title=&year=&author=       list with filters
/// /books                            create (admin)
/// /books/{id}                       get, replace (admin), patch
///
/// /categories                       list
/// /categories/{id}                  get
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/authors", author::router())
        .nest("/books", book::router())
        .nest("/categories", category::router())
}
