use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::limit_creation;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Creation is the only throttled route
    let creation_routes = Router::new()
        .route("/api/documents", post(handlers::create_document))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            limit_creation,
        ));

    let document_routes = Router::new()
        .route(
            "/api/documents/:id",
            get(handlers::get_document).put(handlers::update_document),
        )
        .route("/api/documents/:id/password", post(handlers::set_password))
        .route("/api/documents/:id/expiry", put(handlers::set_expiry));

    let account_routes = Router::new()
        .route("/api/accounts/register", post(handlers::register))
        .route("/api/accounts/login", post(handlers::login))
        .route("/api/accounts/logout", post(handlers::logout))
        .route("/api/accounts/me", get(handlers::me));

    let favorite_routes = Router::new()
        .route(
            "/api/favorites",
            get(handlers::list_favorites).post(handlers::create_favorite),
        )
        .route("/api/favorites/:id", delete(handlers::delete_favorite))
        .route("/api/favorites/merge", post(handlers::merge_favorites));

    Router::new()
        .merge(creation_routes)
        .merge(document_routes)
        .merge(account_routes)
        .merge(favorite_routes)
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
