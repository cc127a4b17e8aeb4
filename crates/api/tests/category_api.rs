//! HTTP-level tests for the read-only `/categories` endpoints.

mod common;

use axum::http::StatusCode;
use biblio_core::catalog::memory::InMemoryCatalogStore;
use common::{body_json, get_auth, user_token};

#[tokio::test]
async fn lists_seeded_categories() {
    let store = InMemoryCatalogStore::new();
    let seeded = store.seed_default_categories().await;
    let app = common::build_test_app(store);

    let response = get_auth(app, "/api/v1/categories", &user_token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), seeded.len());
    assert_eq!(json[0]["nombre"], "fiction");
}

#[tokio::test]
async fn get_by_id_and_missing() {
    let store = InMemoryCatalogStore::new();
    let seeded = store.seed_default_categories().await;
    let app = common::build_test_app(store);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/categories/{}", seeded[2].id),
        &user_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["nombre"], "fantasy");

    let response = get_auth(app, "/api/v1/categories/999", &user_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
