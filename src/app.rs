use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::demo_auth;
use crate::state::AppState;

/// Build the HTTP router.
///
/// API routes live under `/api`; everything else falls through to the
/// static `public` directory (which includes the uploads).
pub fn build_router(state: AppState) -> Router {
    let public_dir = state.config.public_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    let fictions = Router::new()
        .route(
            "/",
            post(api::fictions::create_fiction_handler).get(api::fictions::list_fictions_handler),
        )
        .route("/search", get(api::fictions::search_fictions_handler))
        .route(
            "/category/{category}",
            get(api::fictions::fictions_by_category_handler),
        )
        .route("/{fiction_id}", get(api::fictions::get_fiction_handler));

    let users = Router::new()
        .route("/login", post(demo_auth::login_handler))
        .route("/me", get(api::users::me_handler));

    Router::new()
        .nest("/api/fictions", fictions)
        .nest("/api/users", users)
        .route("/api/test", get(test_handler))
        .route("/unauthorized", get(unauthorized_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn test_handler() -> Json<Value> {
    Json(json!({ "success": true }))
}

async fn unauthorized_handler() -> Json<Value> {
    Json(json!({ "unauthorized": true }))
}
