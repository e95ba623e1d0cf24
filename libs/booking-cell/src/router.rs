use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{optional_session_middleware, session_middleware};
use shared_utils::session::SessionStore;

use crate::handlers::{self, BookingState};

pub fn booking_routes(config: Arc<AppConfig>, sessions: SessionStore) -> Router {
    let state = BookingState::new(config, sessions.clone());

    // Patients may start and submit a booking before they have an account.
    let workflow_routes = Router::new()
        .route("/workflows", post(handlers::start_workflow))
        .route("/workflows/{workflow_id}", get(handlers::get_workflow))
        .route("/workflows/{workflow_id}/date", put(handlers::choose_date))
        .route("/workflows/{workflow_id}/off-day", post(handlers::resolve_off_day))
        .route("/workflows/{workflow_id}/selection", put(handlers::select_entry))
        .route("/workflows/{workflow_id}/submit", post(handlers::submit_workflow))
        .layer(middleware::from_fn_with_state(
            sessions.clone(),
            optional_session_middleware,
        ));

    let doctor_routes = Router::new()
        .route("/on-behalf", post(handlers::book_on_behalf))
        .route("/on-behalf/inventory", get(handlers::on_behalf_inventory))
        .layer(middleware::from_fn_with_state(sessions, session_middleware));

    Router::new()
        .merge(workflow_routes)
        .merge(doctor_routes)
        .with_state(state)
}
