use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;
use shared_utils::extractor::require_doctor;

use crate::models::{
    CheckoutDescriptor, CoinOrderRequest, PaymentFailureRequest, PaymentOutcome, PaymentSaga,
    PaymentSuccessRequest,
};
use crate::services::flow::PaymentFlowService;
use crate::services::ledger::PaymentLedger;

#[derive(Clone)]
pub struct PaymentCellState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub ledger: PaymentLedger,
}

impl PaymentCellState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
            ledger: PaymentLedger::new(),
        }
    }

    fn flow(&self) -> PaymentFlowService {
        PaymentFlowService::new(self.config.clone(), self.backend.clone(), self.ledger.clone())
    }
}

#[axum::debug_handler]
pub async fn create_coin_order(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<CoinOrderRequest>,
) -> Result<Json<CheckoutDescriptor>, AppError> {
    require_doctor(&session)?;

    let descriptor = state.flow().create_coin_order(&session, request.coins).await?;
    Ok(Json(descriptor))
}

#[axum::debug_handler]
pub async fn payment_succeeded(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
    Path(saga_id): Path<String>,
    Json(request): Json<PaymentSuccessRequest>,
) -> Result<Json<PaymentOutcome>, AppError> {
    require_doctor(&session)?;

    let outcome = state.flow().record_success(&session, &saga_id, request).await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn payment_failed(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
    Path(saga_id): Path<String>,
    Json(request): Json<PaymentFailureRequest>,
) -> Result<Json<PaymentOutcome>, AppError> {
    require_doctor(&session)?;

    let outcome = state
        .flow()
        .record_failure(&session, &saga_id, request.reason)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn payment_dismissed(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
    Path(saga_id): Path<String>,
) -> Result<Json<PaymentOutcome>, AppError> {
    require_doctor(&session)?;

    let outcome = state.flow().dismiss(&session, &saga_id).await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
    Path(saga_id): Path<String>,
) -> Result<Json<PaymentSaga>, AppError> {
    let saga = state.ledger.get(&saga_id, &session.user_id).await?;
    Ok(Json(saga))
}

#[axum::debug_handler]
pub async fn list_reconciliation(
    State(state): State<PaymentCellState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Value>, AppError> {
    require_doctor(&session)?;

    let sagas = state.ledger.needing_reconciliation(&session.user_id).await;
    Ok(Json(json!({
        "payments": sagas,
        "total": sagas.len()
    })))
}
