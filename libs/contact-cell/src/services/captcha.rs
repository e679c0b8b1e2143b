use reqwest::Client;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::{CaptchaVerdict, ContactError};

/// reCAPTCHA-compatible `siteverify` client. Disabled when no secret is configured.
pub struct CaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl CaptchaVerifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            secret: config.recaptcha_secret.clone(),
            verify_url: config.recaptcha_verify_url.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    pub async fn verify(&self, token: Option<&str>) -> Result<(), ContactError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ContactError::ValidationError("captcha_token is required".to_string()))?;

        debug!("Verifying CAPTCHA token");

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                error!("CAPTCHA verification request failed: {}", e);
                ContactError::CaptchaUnavailable(e.to_string())
            })?;

        let verdict: CaptchaVerdict = response.json().await.map_err(|e| {
            error!("Unreadable CAPTCHA response: {}", e);
            ContactError::CaptchaUnavailable(e.to_string())
        })?;

        if !verdict.success {
            warn!("CAPTCHA rejected: {:?}", verdict.error_codes);
            return Err(ContactError::CaptchaFailed);
        }

        Ok(())
    }
}
