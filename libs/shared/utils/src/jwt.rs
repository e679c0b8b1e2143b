use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use shared_models::auth::{AdminUser, JwtClaims, ADMIN_ROLE};

/// Issues an HS256 token for a staff account, valid for `ttl_hours`.
pub fn issue_token(
    admin_id: &str,
    email: &str,
    name: Option<&str>,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let claims = JwtClaims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {}", e))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AdminUser, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Token rejected: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
            _ => "Invalid token format".to_string(),
        }
    })?;

    if data.claims.role != ADMIN_ROLE {
        return Err("Token does not carry the admin role".to_string());
    }

    let admin = AdminUser::from(data.claims);
    debug!("Token validated successfully for admin: {}", admin.id);
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn issued_tokens_validate() {
        let token = issue_token("admin-1", "staff@clinic.test", Some("Front Desk"), SECRET, 1).unwrap();
        let admin = validate_token(&token, SECRET).unwrap();
        assert_eq!(admin.id, "admin-1");
        assert_eq!(admin.email, "staff@clinic.test");
        assert_eq!(admin.name.as_deref(), Some("Front Desk"));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token("admin-1", "staff@clinic.test", None, SECRET, -1).unwrap();
        assert_matches!(validate_token(&token, SECRET), Err(msg) if msg == "Token expired");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("admin-1", "staff@clinic.test", None, "other-secret", 1).unwrap();
        assert_matches!(validate_token(&token, SECRET), Err(msg) if msg == "Invalid token signature");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_token("invalid.token.format", SECRET).is_err());
        assert!(issue_token("a", "b", None, "", 1).is_err());
    }
}
