use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use shared_models::dates::{calendar_date, calendar_date_list};
use shared_models::error::AppError;
use shared_models::scheduling::{AppointmentStatus, TimeSlot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(with = "calendar_date_list", default)]
    pub holidays: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn is_on_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialization: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(with = "calendar_date_list", default)]
    pub holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Holiday edits; `add` is applied before `remove`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayUpdateRequest {
    #[serde(with = "calendar_date_list", default)]
    pub add: Vec<NaiveDate>,
    #[serde(with = "calendar_date_list", default)]
    pub remove: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorHolidays {
    pub doctor_id: Uuid,
    #[serde(with = "calendar_date_list")]
    pub holidays: Vec<NaiveDate>,
}

/// The slice of an appointment the admin calendar needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAppointment {
    pub id: Uuid,
    pub appointment_id: String,
    pub patient_name: String,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub services: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub doctor: Doctor,
    #[serde(with = "calendar_date_list")]
    pub holidays: Vec<NaiveDate>,
    pub appointments: Vec<ScheduledAppointment>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Doctor is referenced by existing appointments and cannot be deleted")]
    InUse,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(e: anyhow::Error) -> Self {
        DoctorError::DatabaseError(e.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound(e.to_string()),
            DoctorError::DuplicateEmail(_) | DoctorError::InUse => AppError::Conflict(e.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
