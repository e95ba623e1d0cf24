use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_base_url: String,
    pub backend_timeout_secs: u64,
    pub payment_order_url: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub payment_currency: String,
    pub default_state_id: Option<String>,
    pub completed_status_id: String,
    pub registration_placeholder_password: String,
    pub support_contact: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_base_url: env::var("BACKEND_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("BACKEND_BASE_URL not set, using empty value");
                    String::new()
                }),
            backend_timeout_secs: env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            payment_order_url: env::var("PAYMENT_ORDER_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_ORDER_URL not set, using empty value");
                    String::new()
                }),
            payment_key_id: env::var("PAYMENT_KEY_ID")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_KEY_ID not set, using empty value");
                    String::new()
                }),
            payment_key_secret: env::var("PAYMENT_KEY_SECRET")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_KEY_SECRET not set, checkout signatures will not be verified");
                    String::new()
                }),
            payment_currency: env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| "INR".to_string()),
            default_state_id: env::var("DEFAULT_STATE_ID").ok().filter(|v| !v.is_empty()),
            completed_status_id: env::var("COMPLETED_STATUS_ID")
                .unwrap_or_else(|_| "5".to_string()),
            registration_placeholder_password: env::var("REGISTRATION_PLACEHOLDER_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("REGISTRATION_PLACEHOLDER_PASSWORD not set, using default");
                    "Welcome@123".to_string()
                }),
            support_contact: env::var("SUPPORT_CONTACT")
                .unwrap_or_else(|_| "support@opdconnect.in".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_base_url.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.payment_order_url.is_empty() && !self.payment_key_id.is_empty()
    }
}
