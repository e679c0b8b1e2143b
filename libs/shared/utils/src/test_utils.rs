use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::jwt::issue_token;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";
pub const TEST_RAZORPAY_KEY_ID: &str = "rzp_test_key";
pub const TEST_RAZORPAY_SECRET: &str = "rzp_test_secret";

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_api_key: String,
    pub razorpay_base_url: String,
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
    pub upload_dir: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_api_key: "test-store-key".to_string(),
            razorpay_base_url: "http://localhost:54322".to_string(),
            recaptcha_secret: String::new(),
            recaptcha_verify_url: "http://localhost:54323/siteverify".to_string(),
            upload_dir: std::env::temp_dir().join("clinic-uploads").to_string_lossy().into_owned(),
        }
    }
}

impl TestConfig {
    /// Points both the store and the payment processor at one mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            store_url: uri.to_string(),
            razorpay_base_url: uri.to_string(),
            recaptcha_verify_url: format!("{}/siteverify", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_ttl_hours: 24,
            razorpay_key_id: TEST_RAZORPAY_KEY_ID.to_string(),
            razorpay_key_secret: TEST_RAZORPAY_SECRET.to_string(),
            razorpay_base_url: self.razorpay_base_url.clone(),
            recaptcha_secret: self.recaptcha_secret.clone(),
            recaptcha_verify_url: self.recaptcha_verify_url.clone(),
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: 5 * 1024 * 1024,
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn admin_token(secret: &str) -> String {
        issue_token(&Uuid::new_v4().to_string(), "admin@clinic.test", Some("Test Admin"), secret, 24)
            .expect("test token")
    }

    pub fn expired_token(secret: &str) -> String {
        issue_token(&Uuid::new_v4().to_string(), "admin@clinic.test", None, secret, -1)
            .expect("test token")
    }

    pub fn invalid_signature_token() -> String {
        Self::admin_token("wrong-secret")
    }

    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

/// Document shapes as the store returns them.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor(id: &str, name: &str, holidays: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "specialization": "Orthodontics",
            "email": format!("{}@clinic.test", id),
            "phone": "9876543210",
            "holidays": holidays,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn service(id: &str, name: &str, base_price: f64) -> Value {
        json!({
            "id": id,
            "name": name,
            "base_price": base_price,
            "min_price": null,
            "max_price": null,
            "description": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn appointment(id: &str, appointment_id: &str, doctor_id: &str, date: &str, status: &str) -> Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "patient_name": "Asha Rao",
            "patient_email": "asha@example.com",
            "patient_phone": "9000000001",
            "doctor": doctor_id,
            "services": [Uuid::new_v4()],
            "date": date,
            "time_slot": "10:00 AM - 11:00 AM",
            "payment_option": "Pay advance",
            "advance_amount": 50.0,
            "total_amount": 800.0,
            "payment_status": "Paid",
            "razorpay_order_id": "order_1",
            "razorpay_payment_id": "pay_1",
            "is_offline_booking": false,
            "status": status,
            "notes": null,
            "medical_history": { "dental_problems": [], "treatments": [], "medications": "" },
            "before_image": null,
            "after_image": null,
            "documents": [],
            "created_at": format!("{}T08:00:00Z", date),
            "updated_at": format!("{}T08:00:00Z", date)
        })
    }

    pub fn payment_order(order_id: &str, status: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "order_id": order_id,
            "amount": 5000,
            "currency": "INR",
            "receipt": "receipt_test",
            "status": status,
            "payment_id": null,
            "appointment": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }
}
