use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Booking-page reads, mounted under `/api/appointments`.
pub fn public_doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors_public))
        .route("/doctors/{doctor_id}/holidays", get(handlers::get_doctor_holidays_public))
        .with_state(state)
}

/// Doctor directory management, mounted under `/api/admin`.
pub fn admin_doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors).post(handlers::create_doctor))
        .route(
            "/doctors/{doctor_id}",
            get(handlers::get_doctor)
                .patch(handlers::update_doctor)
                .delete(handlers::delete_doctor),
        )
        .route(
            "/doctors/{doctor_id}/holidays",
            get(handlers::get_doctor_holidays).patch(handlers::update_doctor_holidays),
        )
        .route("/doctors/{doctor_id}/schedule", get(handlers::get_doctor_schedule))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
