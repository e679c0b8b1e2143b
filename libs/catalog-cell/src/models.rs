use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_models::error::AppError;

/// A billable treatment. `min_price`/`max_price` are shown to patients as a
/// guide only and are not checked against `base_price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub base_price: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub base_price: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub base_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Service not found")]
    NotFound,

    #[error("Services not found: {0}")]
    MissingServices(String),

    #[error("Service named {0} already exists")]
    DuplicateName(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Service is referenced by existing appointments and cannot be deleted")]
    InUse,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(e: anyhow::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound | CatalogError::MissingServices(_) => AppError::NotFound(e.to_string()),
            CatalogError::DuplicateName(_) | CatalogError::InUse => AppError::Conflict(e.to_string()),
            CatalogError::ValidationError(msg) => AppError::ValidationError(msg),
            CatalogError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
