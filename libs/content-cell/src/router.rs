use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers::{self, ContentState};

pub fn content_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/contact", post(handlers::submit_contact))
        .with_state(ContentState::new(config))
}
