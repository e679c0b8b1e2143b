use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::AdminUser;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::AuthService;

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let response = AuthService::new(&state).login(request).await?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let admin = AuthService::new(&state).register(request).await?;

    info!("New admin account created: {}", admin.email);

    Ok((StatusCode::CREATED, Json(json!({ "admin": admin }))))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AdminUser>,
) -> Result<Json<Value>, AppError> {
    let admin = AuthService::new(&state).get_admin(&user.id).await?;

    Ok(Json(json!(admin)))
}
