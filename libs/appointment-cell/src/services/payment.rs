use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_models::scheduling::CURRENCY;

use crate::models::{AppointmentError, PaymentProof, ProcessorOrder};

type HmacSha256 = Hmac<Sha256>;

fn signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{}|{}", order_id, payment_id)
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.len() % 2 != 0 {
        return None;
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| raw.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, the checkout signature format.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(signature_payload(order_id, payment_id).as_bytes());
    Some(encode_hex(&mac.finalize().into_bytes()))
}

/// Constant-time comparison of a supplied signature against the expected one.
pub fn signature_matches(secret: &str, proof: &PaymentProof) -> bool {
    let Some(supplied) = decode_hex(proof.razorpay_signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signature_payload(&proof.razorpay_order_id, &proof.razorpay_payment_id).as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

/// Orders API client for the payment processor.
pub struct PaymentService {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl PaymentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.razorpay_base_url.trim_end_matches('/').to_string(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn ensure_configured(&self) -> Result<(), AppointmentError> {
        if self.key_id.is_empty() || self.key_secret.is_empty() {
            error!("Payment keys are missing; cannot talk to the processor");
            return Err(AppointmentError::PaymentNotConfigured);
        }
        Ok(())
    }

    /// POST /v1/orders
    pub async fn create_order(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> Result<ProcessorOrder, AppointmentError> {
        self.ensure_configured()?;

        let url = format!("{}/v1/orders", self.base_url);
        debug!("Requesting order of {} {} from {}", amount_minor, CURRENCY, url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": CURRENCY,
                "receipt": receipt
            }))
            .send()
            .await
            .map_err(|e| AppointmentError::PaymentGateway(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppointmentError::PaymentGateway(e.to_string()))?;

        if !status.is_success() {
            error!("Order creation failed: {} - {}", status, response_text);
            return Err(AppointmentError::PaymentGateway(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        let order: ProcessorOrder = serde_json::from_str(&response_text).map_err(|e| {
            AppointmentError::PaymentGateway(format!("Failed to parse order response: {}", e))
        })?;

        info!("Created payment order {} for {} {}", order.id, order.amount, order.currency);
        Ok(order)
    }

    pub fn verify(&self, proof: &PaymentProof) -> Result<(), AppointmentError> {
        self.ensure_configured()?;

        if signature_matches(&self.key_secret, proof) {
            debug!("Signature verified for payment {}", proof.razorpay_payment_id);
            Ok(())
        } else {
            warn!(
                "Signature mismatch for order {} / payment {}",
                proof.razorpay_order_id, proof.razorpay_payment_id
            );
            Err(AppointmentError::PaymentVerificationFailed)
        }
    }
}
