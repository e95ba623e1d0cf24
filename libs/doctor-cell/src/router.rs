use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // The directory is public; booking and dashboard cells own the
    // authenticated doctor flows.
    Router::new()
        .route("/", get(handlers::search_doctors))
        .route("/specializations", get(handlers::list_specializations))
        .route("/hospitals", get(handlers::list_hospitals))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .with_state(state)
}
