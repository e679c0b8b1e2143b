use chrono::Utc;
use regex::Regex;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};

use crate::models::{ContactError, ContactMessage, ContactRequest};
use crate::services::captcha::CaptchaVerifier;

pub const CONTACTS: &str = "contacts";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254
        && Regex::new(EMAIL_PATTERN)
            .map(|re| re.is_match(email))
            .unwrap_or(false)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_contact(request: &ContactRequest) -> Result<(), ContactError> {
    for (field, value) in [
        ("name", &request.name),
        ("email", &request.email),
        ("message", &request.message),
    ] {
        if value.trim().is_empty() {
            return Err(ContactError::ValidationError(format!("{} is required", field)));
        }
    }
    if !is_valid_email(request.email.trim()) {
        return Err(ContactError::ValidationError("email is not valid".to_string()));
    }
    Ok(())
}

pub struct ContactService {
    store: StoreClient,
    captcha: CaptchaVerifier,
}

impl ContactService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            captcha: CaptchaVerifier::new(config),
        }
    }

    pub async fn create(&self, request: ContactRequest) -> Result<ContactMessage, ContactError> {
        validate_contact(&request)?;
        self.captcha.verify(request.captcha_token.as_deref()).await?;

        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: non_empty(request.phone),
            subject: non_empty(request.subject),
            message: request.message.trim().to_string(),
            created_at: Utc::now(),
        };

        let created: ContactMessage = self.store.insert(CONTACTS, &message).await?;
        info!("Contact message received: {}", created.id);

        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<ContactMessage>, ContactError> {
        debug!("Listing contact messages");
        let mut messages: Vec<ContactMessage> = self
            .store
            .select(CONTACTS, &StoreQuery::new().order("created_at.desc"))
            .await?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    pub async fn get(&self, id: &str) -> Result<ContactMessage, ContactError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| ContactError::NotFound)?;
        self.store
            .select_one(CONTACTS, &StoreQuery::new().eq("id", id))
            .await?
            .ok_or(ContactError::NotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ContactError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| ContactError::NotFound)?;
        let removed = self
            .store
            .delete(CONTACTS, &StoreQuery::new().eq("id", id))
            .await?;
        if removed == 0 {
            return Err(ContactError::NotFound);
        }
        info!("Contact message deleted: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            subject: None,
            message: message.to_string(),
            captcha_token: None,
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("patient@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.in"));
        assert!(!is_valid_email("patient@localhost"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn required_fields() {
        assert!(validate_contact(&request("Asha", "asha@example.com", "Hello")).is_ok());
        assert_matches!(
            validate_contact(&request("Asha", "asha@example.com", "   ")),
            Err(ContactError::ValidationError(msg)) if msg == "message is required"
        );
        assert_matches!(
            validate_contact(&request("Asha", "asha", "Hello")),
            Err(ContactError::ValidationError(_))
        );
    }

    #[test]
    fn blank_optionals_are_dropped() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Braces ".to_string())).as_deref(), Some("Braces"));
    }
}
