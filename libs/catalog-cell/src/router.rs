use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Price list for the booking page, mounted under `/api/appointments`.
pub fn public_service_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services_public))
        .with_state(state)
}

pub fn admin_service_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services).post(handlers::create_service))
        .route(
            "/services/{service_id}",
            get(handlers::get_service)
                .patch(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
