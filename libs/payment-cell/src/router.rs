use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;
use shared_utils::session::SessionStore;

use crate::handlers::{self, PaymentCellState};

pub fn payment_routes(config: Arc<AppConfig>, sessions: SessionStore) -> Router {
    let state = PaymentCellState::new(config);

    Router::new()
        .route("/coin-orders", post(handlers::create_coin_order))
        .route("/reconciliation", get(handlers::list_reconciliation))
        .route("/{saga_id}", get(handlers::get_payment))
        .route("/{saga_id}/success", post(handlers::payment_succeeded))
        .route("/{saga_id}/failure", post(handlers::payment_failed))
        .route("/{saga_id}/dismiss", post(handlers::payment_dismissed))
        .layer(middleware::from_fn_with_state(sessions, session_middleware))
        .with_state(state)
}
