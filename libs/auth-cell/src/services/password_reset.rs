use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, warn};

use shared_backend::{endpoints, BackendClient};
use shared_models::error::{AppError, LOGIN_ROUTE};
use shared_models::notice::Notice;
use shared_utils::validation::FieldValidator;

use crate::models::{
    OtpRequest, ResetPasswordRequest, ResetProgress, ResetStep, ResetStepOutcome, VerifyOtpRequest,
};

/// Progress older than this is forgotten and the flow starts over.
pub const RESET_PROGRESS_TTL_MINUTES: i64 = 15;

#[derive(Clone, Default)]
pub struct ResetProgressStore {
    progress: Arc<RwLock<HashMap<String, ResetProgress>>>,
}

impl ResetProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn step(&self, phone: &str) -> Option<ResetStep> {
        let progress = self.progress.read().await;
        progress
            .get(phone)
            .filter(|p| Utc::now() - p.updated_at < Duration::minutes(RESET_PROGRESS_TTL_MINUTES))
            .map(|p| p.step)
    }

    async fn record(&self, phone: &str, step: ResetStep) {
        self.progress.write().await.insert(
            phone.to_string(),
            ResetProgress {
                phone: phone.to_string(),
                step,
                updated_at: Utc::now(),
            },
        );
    }
}

/// Out-of-order steps are refused before anything is sent.
fn require_step(current: Option<ResetStep>, expected: ResetStep) -> Result<(), AppError> {
    if current == Some(expected) {
        return Ok(());
    }
    let message = match expected {
        ResetStep::OtpSent => "Request a verification code first",
        ResetStep::Verified => "Verify the code sent to your phone first",
        ResetStep::Reset => "Password has already been reset",
    };
    Err(AppError::Conflict(message.to_string()))
}

pub struct PasswordResetService {
    backend: BackendClient,
    store: ResetProgressStore,
}

impl PasswordResetService {
    pub fn new(backend: BackendClient, store: ResetProgressStore) -> Self {
        Self { backend, store }
    }

    pub async fn send_otp(&self, request: OtpRequest) -> Result<ResetStepOutcome, AppError> {
        let phone = request.phone.trim();
        FieldValidator::new().phone("phone", phone).finish()?;

        let envelope = self
            .backend
            .post(endpoints::SEND_OTP, json!({"phone": phone}), None)
            .await?;
        self.store.record(phone, ResetStep::OtpSent).await;

        info!("Password reset code sent");

        Ok(ResetStepOutcome {
            step: ResetStep::OtpSent,
            notice: Notice::info("Code sent", envelope.message_or("A verification code has been sent to your phone.")),
            redirect: None,
        })
    }

    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<ResetStepOutcome, AppError> {
        let phone = request.phone.trim();
        let otp = request.otp.trim();
        FieldValidator::new()
            .phone("phone", phone)
            .required("otp", otp, "Verification code")
            .check(otp.chars().all(|c| c.is_ascii_digit()), "otp", "Verification code must be numeric")
            .finish()?;
        require_step(self.store.step(phone).await, ResetStep::OtpSent)?;

        let envelope = self
            .backend
            .post(endpoints::VERIFY_OTP, json!({"phone": phone, "otp": otp}), None)
            .await?;
        self.store.record(phone, ResetStep::Verified).await;

        Ok(ResetStepOutcome {
            step: ResetStep::Verified,
            notice: Notice::success("Code verified", envelope.message_or("Choose a new password.")),
            redirect: None,
        })
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<ResetStepOutcome, AppError> {
        let phone = request.phone.trim();
        FieldValidator::new()
            .phone("phone", phone)
            .password("new_password", &request.new_password)
            .matches(
                "confirm_password",
                &request.confirm_password,
                &request.new_password,
                "Passwords do not match",
            )
            .finish()?;
        require_step(self.store.step(phone).await, ResetStep::Verified)?;

        let result = self
            .backend
            .post(
                endpoints::RESET_PASSWORD,
                json!({"phone": phone, "newPassword": request.new_password}),
                None,
            )
            .await;
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Password reset failed after verification: {}", e);
                return Err(e.into());
            }
        };
        self.store.record(phone, ResetStep::Reset).await;

        info!("Password reset completed");

        Ok(ResetStepOutcome {
            step: ResetStep::Reset,
            notice: Notice::success("Password updated", envelope.message_or("You can now log in with your new password."))
                .auto_dismiss(3000),
            redirect: Some(LOGIN_ROUTE.to_string()),
        })
    }
}
