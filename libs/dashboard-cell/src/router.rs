use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;
use shared_utils::session::SessionStore;

use crate::handlers::{self, DashboardState};
use crate::services::photo::MAX_PHOTO_BYTES;

pub fn dashboard_routes(config: Arc<AppConfig>, sessions: SessionStore) -> Router {
    let state = DashboardState::new(config);

    Router::new()
        .route("/bookings", get(handlers::get_bookings))
        .route("/bookings/poll", get(handlers::poll_bookings))
        .route("/bookings/{token_id}/status", post(handlers::update_booking_status))
        .route("/wallet", get(handlers::get_wallet))
        .route(
            "/reminders",
            get(handlers::list_reminders).post(handlers::send_reminder),
        )
        .route(
            "/photo",
            // Leave room for the multipart framing around the file.
            post(handlers::upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 64 * 1024)),
        )
        .layer(middleware::from_fn_with_state(sessions, session_middleware))
        .with_state(state)
}
