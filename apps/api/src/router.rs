use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tower_http::services::ServeDir;

use appointment_cell::router::{admin_appointment_routes, appointment_routes};
use auth_cell::router::auth_routes;
use catalog_cell::router::{admin_service_routes, public_service_routes};
use contact_cell::router::{admin_contact_routes, contact_routes};
use doctor_cell::router::{admin_doctor_routes, public_doctor_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let booking = appointment_routes(state.clone())
        .merge(public_doctor_routes(state.clone()))
        .merge(public_service_routes(state.clone()));

    let admin = auth_routes(state.clone())
        .merge(admin_doctor_routes(state.clone()))
        .merge(admin_service_routes(state.clone()))
        .merge(admin_appointment_routes(state.clone()))
        .merge(admin_contact_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Dental clinic API is running!" }))
        .nest("/api/appointments", booking)
        .nest("/api/contacts", contact_routes(state.clone()))
        .nest("/api/admin", admin)
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    use shared_utils::test_utils::TestConfig;

    async fn status_of(uri: &str) -> StatusCode {
        let app = create_router(TestConfig::default().to_arc());
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn root_reports_running() {
        assert_eq!(status_of("/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_surface_is_mounted_and_guarded() {
        assert_eq!(status_of("/api/admin/appointments").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/api/admin/doctors").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/api/admin/contacts").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/api/admin/me").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/api/appointments").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/api/contacts").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        assert_eq!(status_of("/api/nothing-here").await, StatusCode::NOT_FOUND);
    }
}
