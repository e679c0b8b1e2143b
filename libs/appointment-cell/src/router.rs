use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_bearer};

use crate::handlers;

/// Booking, payment and report routes, mounted under `/api/appointments`.
pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Listing is staff-only while booking stays public
    let public_routes = Router::new()
        .route(
            "/",
            get(handlers::list_appointments)
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .post(handlers::create_appointment),
        )
        .route("/create-order", post(handlers::create_order))
        .route("/verify-payment", post(handlers::verify_payment))
        .route("/mongo-id/{id}", get(handlers::get_report_by_document_id))
        .route("/{id}", get(handlers::get_report))
        .route("/{id}/rebook", post(handlers::rebook_appointment));

    let patient_routes = Router::new()
        .route("/{id}/notes", patch(handlers::patient_update_notes))
        .route("/{id}/reschedule", patch(handlers::patient_reschedule))
        .route("/{id}/medical-history", patch(handlers::patient_update_medical_history))
        .layer(middleware::from_fn(require_bearer));

    Router::new()
        .merge(public_routes)
        .merge(patient_routes)
        .with_state(state)
}

/// Appointment back-office, mounted under `/api/admin`.
pub fn admin_appointment_routes(state: Arc<AppConfig>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/appointments", get(handlers::admin_list_appointments))
        .route("/appointments/export", get(handlers::export_appointments))
        .route("/appointments/offline", post(handlers::book_offline))
        .route(
            "/appointments/{id}",
            get(handlers::get_appointment).delete(handlers::delete_appointment),
        )
        .route("/appointments/{id}/rebook", post(handlers::admin_rebook))
        .route("/appointments/{id}/status", patch(handlers::update_status))
        .route("/appointments/{id}/reschedule", patch(handlers::reschedule))
        .route("/appointments/{id}/medical-history", patch(handlers::update_medical_history))
        .route("/appointments/{id}/notes", patch(handlers::update_notes))
        .route("/appointments/{id}/patient", patch(handlers::update_patient))
        .route(
            "/appointments/{id}/upload-before-image",
            patch(handlers::upload_before_image).layer(upload_limit),
        )
        .route(
            "/appointments/{id}/upload-after-image",
            patch(handlers::upload_after_image).layer(upload_limit),
        )
        .route(
            "/appointments/{id}/upload-document",
            patch(handlers::upload_document).layer(upload_limit),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
