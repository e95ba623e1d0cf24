use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::{self, LocationState};

pub fn location_routes(config: Arc<AppConfig>) -> Router {
    let state = LocationState::new(config);

    Router::new()
        .route("/states", get(handlers::list_states))
        .route("/states/{state_id}/districts", get(handlers::list_districts))
        .route("/cascades", post(handlers::mount_cascade))
        .route("/cascades/{cascade_id}", get(handlers::get_cascade))
        .route("/cascades/{cascade_id}/state", put(handlers::select_state))
        .route("/cascades/{cascade_id}/district", put(handlers::select_district))
        .with_state(state)
}
