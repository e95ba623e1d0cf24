use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::loose::opt_id_string;
use shared_models::notice::Notice;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub session_id: String,
    pub user_id: String,
    pub user_name: String,
    pub role_id: String,
    pub remembered_phone: Option<String>,
    pub redirect: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDoctorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub specialization_id: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub user_id: Option<String>,
    pub notice: Notice,
    pub redirect: String,
}

/// Profile as `getUserDetails` returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    #[serde(default, alias = "userId", alias = "user_id", deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default, alias = "userName", alias = "user_name")]
    pub name: Option<String>,
    #[serde(default, alias = "mobile")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "roleId", alias = "role_id", deserialize_with = "opt_id_string")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResetStep {
    OtpSent,
    Verified,
    Reset,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetProgress {
    pub phone: String,
    pub step: ResetStep,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetStepOutcome {
    pub step: ResetStep,
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}
