use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::{AppError, LOGIN_ROUTE};
use shared_models::session::SessionContext;
use shared_utils::session::SessionStore;

use crate::models::{
    LoginRequest, LoginResponse, OtpRequest, RegisterDoctorRequest, RegisterUserRequest,
    RegistrationOutcome, ResetPasswordRequest, ResetStepOutcome, UserDetails, VerifyOtpRequest,
};
use crate::services::login::LoginService;
use crate::services::password_reset::{PasswordResetService, ResetProgressStore};
use crate::services::registration::RegistrationService;

#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub resets: ResetProgressStore,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>, sessions: SessionStore) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
            sessions,
            resets: ResetProgressStore::new(),
        }
    }

    fn login_service(&self) -> LoginService {
        LoginService::new(self.backend.clone(), self.sessions.clone())
    }

    fn reset_service(&self) -> PasswordResetService {
        PasswordResetService::new(self.backend.clone(), self.resets.clone())
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.login_service().login(request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AuthState>,
    Extension(session): Extension<SessionContext>,
) -> Json<Value> {
    state.login_service().logout(&session).await;
    Json(json!({ "redirect": LOGIN_ROUTE }))
}

#[axum::debug_handler]
pub async fn current_session(Extension(session): Extension<SessionContext>) -> Json<Value> {
    Json(json!({
        "session": session,
        "home": session.home_route()
    }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AuthState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UserDetails>, AppError> {
    let details = state.login_service().user_details(&session).await?;
    Ok(Json(details))
}

#[axum::debug_handler]
pub async fn register_user(
    State(state): State<AuthState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<RegistrationOutcome>, AppError> {
    let outcome = RegistrationService::with_client(state.backend.clone())
        .register_user(request)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<AuthState>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<Json<RegistrationOutcome>, AppError> {
    let outcome = RegistrationService::with_client(state.backend.clone())
        .register_doctor(request)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn send_otp(
    State(state): State<AuthState>,
    Json(request): Json<OtpRequest>,
) -> Result<Json<ResetStepOutcome>, AppError> {
    let outcome = state.reset_service().send_otp(request).await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AuthState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<ResetStepOutcome>, AppError> {
    let outcome = state.reset_service().verify_otp(request).await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AuthState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetStepOutcome>, AppError> {
    let outcome = state.reset_service().reset_password(request).await?;
    Ok(Json(outcome))
}
