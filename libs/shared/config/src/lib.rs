use std::env;
use tracing::warn;

pub const DEFAULT_RAZORPAY_BASE_URL: &str = "https://api.razorpay.com";
pub const DEFAULT_RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: String,
    pub store_api_key: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub port: u16,
}

fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", key);
        String::new()
    })
}

fn with_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using default", key);
        default.to_string()
    })
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_url: required("STORE_URL"),
            store_api_key: required("STORE_API_KEY"),
            jwt_secret: required("JWT_SECRET"),
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24),
            razorpay_key_id: required("RAZORPAY_KEY_ID"),
            razorpay_key_secret: required("RAZORPAY_KEY_SECRET"),
            razorpay_base_url: with_default("RAZORPAY_BASE_URL", DEFAULT_RAZORPAY_BASE_URL),
            // An empty secret switches CAPTCHA checks off for the contact form
            recaptcha_secret: env::var("RECAPTCHA_SECRET_KEY").unwrap_or_default(),
            recaptcha_verify_url: with_default("RECAPTCHA_VERIFY_URL", DEFAULT_RECAPTCHA_VERIFY_URL),
            upload_dir: with_default("UPLOAD_DIR", "uploads"),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            port: parsed("PORT", 5000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }
        if !config.is_payment_configured() {
            warn!("Payment processor keys missing - online booking will fail");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.store_url.is_empty()
            && !self.store_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.razorpay_key_id.is_empty()
            && !self.razorpay_key_secret.is_empty()
            && !self.razorpay_base_url.is_empty()
    }

    pub fn is_captcha_enabled(&self) -> bool {
        !self.recaptcha_secret.is_empty()
    }
}
