use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_cell::{CatalogError, Service};
use doctor_cell::DoctorError;
use shared_models::dates::{calendar_date, optional_calendar_date};
use shared_models::error::AppError;
use shared_models::scheduling::{AppointmentStatus, PaymentOption, PaymentStatus, TimeSlot};

// ==============================================================================
// APPOINTMENT RECORD
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default)]
    pub dental_problems: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<String>,
    #[serde(default)]
    pub medications: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDocument {
    pub name: String,
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Report token shared by every booking in a treatment group.
    pub appointment_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub doctor: Uuid,
    pub services: Vec<Uuid>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub payment_option: PaymentOption,
    pub advance_amount: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub is_offline_booking: bool,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medical_history: MedicalHistory,
    #[serde(default)]
    pub before_image: Option<String>,
    #[serde(default)]
    pub after_image: Option<String>,
    #[serde(default)]
    pub documents: Vec<AppointmentDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================================================================
// PAYMENT ORDERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOrderStatus {
    Created,
    Verified,
    /// Held by the one request currently writing the appointment.
    Claimed,
    Consumed,
}

impl PaymentOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOrderStatus::Created => "Created",
            PaymentOrderStatus::Verified => "Verified",
            PaymentOrderStatus::Claimed => "Claimed",
            PaymentOrderStatus::Consumed => "Consumed",
        }
    }
}

/// Processor order tracked between checkout and the appointment write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: Uuid,
    pub order_id: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub status: PaymentOrderStatus,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub appointment: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order as returned by the processor's orders API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

/// Doctor, services, date and slot chosen for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSelection {
    pub doctor: Uuid,
    pub services: Vec<Uuid>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDetails {
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    /// Validated before the processor is contacted when present.
    #[serde(default)]
    pub booking: Option<BookingSelection>,
    #[serde(default)]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(flatten)]
    pub patient: PatientDetails,
    #[serde(flatten)]
    pub payment: PaymentProof,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medical_history: Option<MedicalHistory>,
    /// Joins an existing report group instead of issuing a new token.
    #[serde(default)]
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfflineBookingRequest {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(flatten)]
    pub patient: PatientDetails,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medical_history: Option<MedicalHistory>,
    #[serde(default)]
    pub appointment_id: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RebookRequest {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub keep_report_id: bool,
    /// Required on the patient path; ignored for offline rebooking.
    #[serde(flatten)]
    pub payment: Option<PaymentProof>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RescheduleRequest {
    #[serde(default, with = "optional_calendar_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: Option<TimeSlot>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesUpdateRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicalHistoryUpdate {
    pub dental_problems: Option<Vec<String>>,
    pub treatments: Option<Vec<String>>,
    pub medications: Option<String>,
}

impl MedicalHistoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.dental_problems.is_none() && self.treatments.is_none() && self.medications.is_none()
    }

    pub fn apply(self, mut history: MedicalHistory) -> MedicalHistory {
        if let Some(problems) = self.dental_problems {
            history.dental_problems = problems;
        }
        if let Some(treatments) = self.treatments {
            history.treatments = treatments;
        }
        if let Some(medications) = self.medications {
            history.medications = medications;
        }
        history
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdateRequest {
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
}

/// Admin listing filters; `search` matches name, email, phone or report token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub doctor: Option<Uuid>,
    #[serde(default, with = "optional_calendar_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, with = "optional_calendar_date")]
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub offline: Option<bool>,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone)]
pub struct Quote {
    pub services: Vec<Service>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub duplicate: bool,
}

/// Every record sharing one report token, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub appointment_id: String,
    pub primary: Appointment,
    pub history: Vec<Appointment>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub documents: Vec<AppointmentDocument>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Services not found: {0}")]
    ServicesNotFound(String),

    #[error("Doctor is on holiday on {0}")]
    DoctorOnHoliday(NaiveDate),

    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment must be approved by staff before it can be rescheduled")]
    AwaitingApproval,

    #[error("Payment verification failed")]
    PaymentVerificationFailed,

    #[error("No payment order recorded for {0}")]
    UnknownPaymentOrder(String),

    #[error("Payment {0} is already being booked")]
    PaymentInProgress(String),

    #[error("Payment processing is not configured")]
    PaymentNotConfigured,

    #[error("Payment processor error: {0}")]
    PaymentGateway(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Upload failed: {0}")]
    UploadError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(e: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::ValidationError(msg) => AppointmentError::ValidationError(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<CatalogError> for AppointmentError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => AppointmentError::ServicesNotFound("unknown service".to_string()),
            CatalogError::MissingServices(ids) => AppointmentError::ServicesNotFound(ids),
            CatalogError::ValidationError(msg) => AppointmentError::ValidationError(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::ServicesNotFound(_) => AppError::NotFound(e.to_string()),
            AppointmentError::DoctorOnHoliday(_)
            | AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::AwaitingApproval => {
                AppError::BadRequest(e.to_string())
            }
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::PaymentVerificationFailed => AppError::PaymentVerification(e.to_string()),
            AppointmentError::UnknownPaymentOrder(_) => AppError::PaymentVerification(e.to_string()),
            AppointmentError::PaymentInProgress(_) => AppError::Conflict(e.to_string()),
            AppointmentError::PaymentNotConfigured => AppError::Internal(e.to_string()),
            AppointmentError::PaymentGateway(msg) => AppError::ExternalService(msg),
            AppointmentError::UploadError(msg) => AppError::Internal(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
