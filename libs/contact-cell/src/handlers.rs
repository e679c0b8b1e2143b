use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::ContactRequest;
use crate::services::ContactService;

#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let message = ContactService::new(&state).create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Thank you for contacting us. We will get back to you soon.",
            "contact": message
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_contacts(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let contacts = ContactService::new(&state).list().await?;

    Ok(Json(json!({
        "contacts": contacts,
        "total": contacts.len()
    })))
}

#[axum::debug_handler]
pub async fn get_contact(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let contact = ContactService::new(&state).get(&id).await?;

    Ok(Json(json!(contact)))
}

#[axum::debug_handler]
pub async fn delete_contact(
    State(state): State<Arc<AppConfig>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    ContactService::new(&state).delete(&id).await?;

    Ok(Json(json!({ "message": "Contact message deleted" })))
}
