use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;
use shared_utils::session::SessionStore;

use crate::handlers::{self, AuthState};

pub fn auth_routes(config: Arc<AppConfig>, sessions: SessionStore) -> Router {
    let state = AuthState::new(config, sessions.clone());

    let public_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/register/user", post(handlers::register_user))
        .route("/register/doctor", post(handlers::register_doctor))
        .route("/password/otp", post(handlers::send_otp))
        .route("/password/verify", post(handlers::verify_otp))
        .route("/password/reset", post(handlers::reset_password));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::current_session))
        .route("/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(sessions, session_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
