use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};
use shared_utils::jwt::issue_token;

use crate::models::{Admin, AdminProfile, AuthError, LoginRequest, LoginResponse, RegisterRequest};
use crate::services::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};

pub const ADMINS: &str = "admins";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
    if request.name.trim().is_empty() {
        return Err(AuthError::ValidationError("name is required".to_string()));
    }
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::ValidationError("a valid email is required".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::ValidationError(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub struct AuthService {
    store: StoreClient,
    jwt_secret: String,
    ttl_hours: i64,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            ttl_hours: config.jwt_ttl_hours,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AuthError> {
        let admin = self
            .store
            .select_one(ADMINS, &StoreQuery::new().eq("email", email))
            .await?;
        Ok(admin)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AdminProfile, AuthError> {
        validate_registration(&request)?;

        let email = normalize_email(&request.email);
        debug!("Registering admin: {}", email);

        if self.find_by_email(&email).await?.is_some() {
            warn!("Registration rejected, email already in use: {}", email);
            return Err(AuthError::DuplicateEmail(email));
        }

        let password_hash = hash_password(&request.password).map_err(|e| {
            error!("Password hashing failed: {}", e);
            AuthError::ValidationError("password could not be processed".to_string())
        })?;

        let now = Utc::now();
        let admin = Admin {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created: Admin = self.store.insert(ADMINS, &admin).await?;
        info!("Admin registered: {}", created.id);

        Ok(created.into())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(&request.email);
        debug!("Login attempt for: {}", email);

        let admin = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = verify_password(&request.password, &admin.password_hash).map_err(|e| {
            error!("Stored password hash for {} is unreadable: {}", admin.id, e);
            AuthError::InvalidCredentials
        })?;
        if !matches {
            warn!("Wrong password for admin: {}", admin.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(
            &admin.id.to_string(),
            &admin.email,
            Some(&admin.name),
            &self.jwt_secret,
            self.ttl_hours,
        )
        .map_err(AuthError::TokenError)?;

        info!("Admin logged in: {}", admin.id);

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl_hours * 3600,
            admin: admin.into(),
        })
    }

    pub async fn get_admin(&self, admin_id: &str) -> Result<AdminProfile, AuthError> {
        let id = Uuid::parse_str(admin_id).map_err(|_| AuthError::NotFound)?;
        let admin: Admin = self
            .store
            .select_one(ADMINS, &StoreQuery::new().eq("id", id))
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(admin.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn registration_requires_all_fields() {
        assert!(validate_registration(&request("Desk", "desk@clinic.test", "longenough")).is_ok());
        assert_matches!(
            validate_registration(&request(" ", "desk@clinic.test", "longenough")),
            Err(AuthError::ValidationError(_))
        );
        assert_matches!(
            validate_registration(&request("Desk", "not-an-email", "longenough")),
            Err(AuthError::ValidationError(_))
        );
        assert_matches!(
            validate_registration(&request("Desk", "desk@clinic.test", "short")),
            Err(AuthError::ValidationError(msg)) if msg.contains("8")
        );
    }

    #[test]
    fn emails_are_case_insensitive() {
        assert_eq!(normalize_email("  Desk@Clinic.TEST "), "desk@clinic.test");
    }
}
