use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default, alias = "recaptchaToken")]
    pub captcha_token: Option<String>,
}

/// Body of a `siteverify` answer; only the verdict matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaVerdict {
    pub success: bool,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ContactError {
    #[error("Contact message not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("CAPTCHA verification failed")]
    CaptchaFailed,

    #[error("CAPTCHA service error: {0}")]
    CaptchaUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for ContactError {
    fn from(e: anyhow::Error) -> Self {
        ContactError::DatabaseError(e.to_string())
    }
}

impl From<ContactError> for AppError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound => AppError::NotFound(e.to_string()),
            ContactError::ValidationError(msg) => AppError::ValidationError(msg),
            ContactError::CaptchaFailed => AppError::BadRequest(e.to_string()),
            ContactError::CaptchaUnavailable(msg) => AppError::ExternalService(msg),
            ContactError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
