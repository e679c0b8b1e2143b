use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use doctor_cell::DoctorService;
use shared_config::AppConfig;
use shared_models::auth::AdminUser;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::{
    AppointmentError, AppointmentFilter, BookingOutcome, CreateAppointmentRequest,
    CreateOrderRequest, MedicalHistoryUpdate, NotesUpdateRequest, OfflineBookingRequest,
    PatientUpdateRequest, PaymentProof, RebookRequest, RescheduleRequest, StatusUpdateRequest,
};
use crate::services::{
    booking::AppointmentBookingService,
    export::appointments_to_csv,
    records::{AppointmentRecordService, ImageSlot},
    report::ReportService,
    uploads::{is_image, UploadService},
};

fn booking_response(outcome: BookingOutcome) -> (StatusCode, Json<Value>) {
    let status = if outcome.duplicate { StatusCode::OK } else { StatusCode::CREATED };
    (status, Json(json!(outcome)))
}

// ==============================================================================
// PUBLIC BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_order(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<CreateOrderRequest>,
) -> Result<Json<Value>, AppError> {
    let order = AppointmentBookingService::new(&state)
        .create_order(request)
        .await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn verify_payment(
    State(state): State<Arc<AppConfig>>,
    AppJson(proof): AppJson<PaymentProof>,
) -> Result<Json<Value>, AppError> {
    AppointmentBookingService::new(&state)
        .verify_payment(&proof)
        .await?;

    Ok(Json(json!({
        "verified": true,
        "order_id": proof.razorpay_order_id,
        "payment_id": proof.razorpay_payment_id
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = AppointmentBookingService::new(&state)
        .create_appointment(request)
        .await?;

    Ok(booking_response(outcome))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentRecordService::new(&state)
        .list(&AppointmentFilter::default())
        .await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, AppError> {
    let report = ReportService::new(&state).lookup(&identifier).await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn get_report_by_document_id(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(id.trim()).map_err(|_| AppointmentError::NotFound)?;
    let report = ReportService::new(&state).lookup_by_document_id(id).await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn rebook_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<RebookRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = AppointmentBookingService::new(&state)
        .rebook(&identifier, request, false)
        .await?;

    Ok(booking_response(outcome))
}

// ==============================================================================
// PATIENT EDITS (BEARER TOKEN REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn patient_update_notes(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<NotesUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .update_notes(&identifier, request.notes)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn patient_reschedule(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    // Patients cannot pick the resulting status
    let request = RescheduleRequest { status: None, ..request };
    let appointment = AppointmentRecordService::new(&state)
        .reschedule(&identifier, request)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn patient_update_medical_history(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(update): AppJson<MedicalHistoryUpdate>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .update_medical_history(&identifier, update)
        .await?;

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn admin_list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentRecordService::new(&state).list(&filter).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn export_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = AppointmentRecordService::new(&state).list(&filter).await?;
    let doctor_names: HashMap<Uuid, String> = DoctorService::new(&state)
        .list_doctors()
        .await?
        .into_iter()
        .map(|doctor| (doctor.id, doctor.name))
        .collect();

    info!("Admin {} exported {} appointments", admin.email, appointments.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"appointments.csv\""),
        ],
        appointments_to_csv(&appointments, &doctor_names),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .resolve(&identifier)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn book_offline(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    AppJson(request): AppJson<OfflineBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("Admin {} booking offline appointment", admin.email);

    let appointment = AppointmentBookingService::new(&state)
        .book_offline(request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn admin_rebook(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<RebookRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = AppointmentBookingService::new(&state)
        .rebook(&identifier, request, true)
        .await?;

    Ok(booking_response(outcome))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Admin {} setting {} to {}", admin.email, identifier, request.status);

    let appointment = AppointmentRecordService::new(&state)
        .update_status(&identifier, request.status)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .reschedule(&identifier, request)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_medical_history(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(update): AppJson<MedicalHistoryUpdate>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .update_medical_history(&identifier, update)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_notes(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<NotesUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .update_notes(&identifier, request.notes)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    AppJson(request): AppJson<PatientUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentRecordService::new(&state)
        .update_patient(&identifier, request)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = AppointmentRecordService::new(&state)
        .delete(&identifier)
        .await?;
    info!("Admin {} deleted appointment {}", admin.email, deleted.id);

    Ok(Json(json!({
        "message": "Appointment deleted successfully",
        "id": deleted.id,
        "appointment_id": deleted.appointment_id
    })))
}

// ==============================================================================
// UPLOADS
// ==============================================================================

struct UploadedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// First file part of the form, whatever its field name.
async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok(UploadedFile {
            name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::ValidationError("No file uploaded".to_string()))
}

async fn store_image(
    state: &AppConfig,
    identifier: &str,
    slot: ImageSlot,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let file = read_file(multipart).await?;
    if !is_image(&file.mime_type) {
        return Err(AppError::ValidationError(format!(
            "Expected an image, got {}",
            file.mime_type
        )));
    }

    let records = AppointmentRecordService::new(state);
    // Fail before writing anything for an unknown appointment
    let appointment = records.resolve(identifier).await?;

    let stored = UploadService::new(state)
        .save(&file.name, &file.mime_type, &file.bytes)
        .await?;
    let updated = records
        .set_image(&appointment.id.to_string(), slot, &stored.path)
        .await?;

    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn upload_before_image(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    store_image(&state, &identifier, ImageSlot::Before, multipart).await
}

#[axum::debug_handler]
pub async fn upload_after_image(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    store_image(&state, &identifier, ImageSlot::After, multipart).await
}

#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<Arc<AppConfig>>,
    Path(identifier): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let file = read_file(multipart).await?;

    let records = AppointmentRecordService::new(&state);
    let appointment = records.resolve(&identifier).await?;

    let document = UploadService::new(&state)
        .save(&file.name, &file.mime_type, &file.bytes)
        .await?;
    let updated = records
        .add_document(&appointment.id.to_string(), document)
        .await?;

    Ok(Json(json!(updated)))
}
