use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Contact form, mounted under `/api/contacts`. Reading the inbox needs a staff token.
pub fn contact_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_contacts)
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .post(handlers::submit_contact),
        )
        .with_state(state)
}

/// Inbox management, mounted under `/api/admin`.
pub fn admin_contact_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/contacts", get(handlers::list_contacts))
        .route(
            "/contacts/{id}",
            get(handlers::get_contact).delete(handlers::delete_contact),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
