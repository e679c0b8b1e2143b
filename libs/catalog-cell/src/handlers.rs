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

use crate::models::{CreateServiceRequest, UpdateServiceRequest};
use crate::services::catalog::{parse_service_id, CatalogService};

#[axum::debug_handler]
pub async fn list_services_public(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let services = CatalogService::new(&state).list_services().await?;

    Ok(Json(json!(services)))
}

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let services = CatalogService::new(&state).list_services().await?;

    Ok(Json(json!({
        "services": services,
        "total": services.len()
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state)
        .get_service(parse_service_id(&service_id)?)
        .await?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    AppJson(request): AppJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("Admin {} creating service {}", admin.email, request.name);

    let service = CatalogService::new(&state).create_service(request).await?;

    Ok((StatusCode::CREATED, Json(json!(service))))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<String>,
    AppJson(request): AppJson<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&state)
        .update_service(parse_service_id(&service_id)?, request)
        .await?;

    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<Arc<AppConfig>>,
    Extension(admin): Extension<AdminUser>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service_id = parse_service_id(&service_id)?;
    info!("Admin {} deleting service {}", admin.email, service_id);

    CatalogService::new(&state).delete_service(service_id).await?;

    Ok(Json(json!({
        "message": "Service deleted successfully",
        "service_id": service_id
    })))
}
