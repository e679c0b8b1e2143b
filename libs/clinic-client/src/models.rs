use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::dates::{calendar_date, calendar_date_list, optional_calendar_date};
use shared_models::scheduling::{AppointmentStatus, PaymentOption, PaymentStatus, TimeSlot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(with = "calendar_date_list", default)]
    pub holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub base_price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorHolidays {
    pub doctor_id: Uuid,
    #[serde(with = "calendar_date_list")]
    pub holidays: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayUpdate {
    #[serde(with = "calendar_date_list", default)]
    pub add: Vec<NaiveDate>,
    #[serde(with = "calendar_date_list", default)]
    pub remove: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub doctor: Uuid,
    pub services: Vec<Uuid>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub booking: Option<BookingSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSubmission {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(flatten)]
    pub patient: PatientDetails,
    #[serde(flatten)]
    pub payment: PaymentProof,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfflineBooking {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(flatten)]
    pub patient: PatientDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
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
    pub status: AppointmentStatus,
    #[serde(default)]
    pub is_offline_booking: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A booking answer; `duplicate` is set when the payment had already been booked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub appointment_id: String,
    pub primary: Appointment,
    pub history: Vec<Appointment>,
    #[serde(default)]
    pub before_image: Option<String>,
    #[serde(default)]
    pub after_image: Option<String>,
    #[serde(default)]
    pub documents: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescheduleChange {
    #[serde(with = "optional_calendar_date")]
    pub date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: AdminProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}
