use tracing::info;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{AdminProfile, LoginResponse};

/// Back-office login state. Admin calls read the token from here.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Option<String>,
    admin: Option<AdminProfile>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_login(response: LoginResponse) -> Self {
        Self {
            token: Some(response.token),
            admin: Some(response.admin),
        }
    }

    pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<Self, ClientError> {
        let response = api.login(email, password).await?;
        info!("Signed in as {}", response.admin.email);
        Ok(Self::from_login(response))
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.admin = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn admin(&self) -> Option<&AdminProfile> {
        self.admin.as_ref()
    }

    pub fn bearer(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::Unauthenticated)
    }
}
