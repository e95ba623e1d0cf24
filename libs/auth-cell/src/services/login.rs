use serde_json::json;
use tracing::{debug, info, warn};

use shared_backend::{endpoints, BackendClient, BackendError};
use shared_models::error::AppError;
use shared_models::session::{NewSession, SessionContext, PATIENT_ROLE_ID};
use shared_utils::session::SessionStore;
use shared_utils::validation::FieldValidator;

use crate::models::{LoginRequest, LoginResponse, UserDetails};

pub struct LoginService {
    backend: BackendClient,
    sessions: SessionStore,
}

impl LoginService {
    pub fn new(backend: BackendClient, sessions: SessionStore) -> Self {
        Self { backend, sessions }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let phone = request.phone.trim().to_string();
        FieldValidator::new()
            .phone("phone", &phone)
            .required("password", &request.password, "Password")
            .finish()?;

        let envelope = self
            .backend
            .post(
                endpoints::LOGIN,
                json!({"phone": phone, "password": request.password}),
                None,
            )
            .await
            .map_err(|e| match e {
                BackendError::Rejected(message) => AppError::Auth(message),
                other => AppError::from(other),
            })?;

        let user_id = envelope
            .first_string(&["userId", "user_id", "id"])
            .ok_or_else(|| AppError::from(BackendError::Decode("login returned no user id".to_string())))?;
        let auth_token = envelope
            .first_string(&["token", "accessToken", "access_token"])
            .unwrap_or_else(|| {
                warn!("Login for user {} returned no backend token", user_id);
                String::new()
            });
        let role_id = envelope
            .first_string(&["roleId", "role_id", "role"])
            .unwrap_or_else(|| PATIENT_ROLE_ID.to_string());
        let user_name = envelope
            .first_string(&["name", "userName", "user_name"])
            .unwrap_or_default();

        let session = self
            .sessions
            .create(NewSession {
                user_id,
                user_name,
                role_id,
                auth_token,
                remembered_phone: request.remember_me.then(|| phone.clone()),
            })
            .await;

        info!("User {} logged in", session.user_id);

        Ok(LoginResponse {
            redirect: session.home_route().to_string(),
            session_id: session.session_id,
            user_id: session.user_id,
            user_name: session.user_name,
            role_id: session.role_id,
            remembered_phone: session.remembered_phone,
        })
    }

    pub async fn logout(&self, session: &SessionContext) {
        if self.sessions.clear(&session.session_id).await.is_some() {
            info!("User {} logged out", session.user_id);
        }
    }

    pub async fn user_details(&self, session: &SessionContext) -> Result<UserDetails, AppError> {
        debug!("Fetching details for user {}", session.user_id);
        let envelope = self
            .backend
            .get(
                endpoints::USER_DETAILS,
                &[("userId", session.user_id.as_str())],
                Some(&session.auth_token),
            )
            .await?;
        Ok(envelope.data_as()?)
    }
}
