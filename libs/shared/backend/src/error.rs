use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The backend answered `status: false`; the message is meant for the user.
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected_message(&self) -> Option<&str> {
        match self {
            BackendError::Rejected(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected(msg) => AppError::Backend(msg),
            BackendError::Status { status: 401 | 403, body } => AppError::Auth(body),
            BackendError::Status { status: 404, body } => AppError::NotFound(body),
            BackendError::Status { status, body } => {
                AppError::ExternalService(format!("backend returned {}: {}", status, body))
            }
            BackendError::Transport(e) => AppError::ExternalService(e.to_string()),
            BackendError::Decode(msg) => AppError::ExternalService(msg),
        }
    }
}
