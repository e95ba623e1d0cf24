use std::sync::Arc;

use axum::{extract::State, Json};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ContactMessage, ContactReceipt};
use crate::services::contact::ContactService;

#[derive(Clone)]
pub struct ContentState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
}

impl ContentState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
        }
    }
}

#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<ContentState>,
    Json(message): Json<ContactMessage>,
) -> Result<Json<ContactReceipt>, AppError> {
    let receipt = ContactService::with_client(state.backend.clone())
        .submit(message)
        .await?;
    Ok(Json(receipt))
}
