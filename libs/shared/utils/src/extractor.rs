use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::BearerToken;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// JSON body whose rejections answer 400 with the usual `{message}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    Ok(token.to_string())
}

// Validates the staff token and exposes the admin to handlers
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let admin = validate_token(&token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}

// Patient-side mutations only require that a token is sent
pub async fn require_bearer(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}
