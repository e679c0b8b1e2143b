use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Staff sign-in, mounted under `/api/admin`.
pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .merge(protected)
        .with_state(state)
}
