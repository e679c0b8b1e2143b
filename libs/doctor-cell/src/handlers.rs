use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::AdminUser;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::{CreateDoctorRequest, HolidayUpdateRequest, UpdateDoctorRequest};
use crate::services::{
    availability::AvailabilityService,
    doctor::{parse_doctor_id, DoctorService},
};

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors_public(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.list_doctors().await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor_holidays_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let holidays = availability_service
        .get_holidays(parse_doctor_id(&doctor_id)?)
        .await?;

    Ok(Json(json!(holidays)))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state).list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state)
        .get_doctor(parse_doctor_id(&doctor_id)?)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    AppJson(request): AppJson<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("Admin {} creating doctor {}", admin.email, request.email);

    let doctor = DoctorService::new(&state).create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    AppJson(request): AppJson<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state)
        .update_doctor(parse_doctor_id(&doctor_id)?, request)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    info!("Admin {} deleting doctor {}", admin.email, doctor_id);

    DoctorService::new(&state).delete_doctor(doctor_id).await?;

    Ok(Json(json!({
        "message": "Doctor deleted successfully",
        "doctor_id": doctor_id
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_holidays(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let holidays = AvailabilityService::new(&state)
        .get_holidays(parse_doctor_id(&doctor_id)?)
        .await?;

    Ok(Json(json!(holidays)))
}

#[axum::debug_handler]
pub async fn update_doctor_holidays(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    AppJson(request): AppJson<HolidayUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let holidays = AvailabilityService::new(&state)
        .update_holidays(parse_doctor_id(&doctor_id)?, request)
        .await?;

    Ok(Json(json!(holidays)))
}

#[axum::debug_handler]
pub async fn get_doctor_schedule(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let schedule = AvailabilityService::new(&state)
        .get_schedule(parse_doctor_id(&doctor_id)?)
        .await?;

    Ok(Json(json!(schedule)))
}
