use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOCTOR_ROLE_ID: &str = "2";
pub const PATIENT_ROLE_ID: &str = "1";

pub const USER_DASHBOARD_ROUTE: &str = "/user/dashboard";
pub const DOCTOR_DASHBOARD_ROUTE: &str = "/doctor/dashboard";

/// Identity of the signed-in user or doctor, injected into handlers by the
/// session middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub user_id: String,
    pub user_name: String,
    pub role_id: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    pub remembered_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn is_doctor(&self) -> bool {
        self.role_id == DOCTOR_ROLE_ID
    }

    pub fn home_route(&self) -> &'static str {
        if self.is_doctor() {
            DOCTOR_DASHBOARD_ROUTE
        } else {
            USER_DASHBOARD_ROUTE
        }
    }
}

/// What a login or registration yields before a session id is assigned.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: String,
    pub user_name: String,
    pub role_id: String,
    pub auth_token: String,
    pub remembered_phone: Option<String>,
}
