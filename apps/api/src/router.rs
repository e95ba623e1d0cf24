use std::sync::Arc;

use axum::{routing::get, Router};

use auth_cell::router::auth_routes;
use booking_cell::router::booking_routes;
use content_cell::router::content_routes;
use dashboard_cell::router::dashboard_routes;
use doctor_cell::router::doctor_routes;
use location_cell::router::location_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;
use shared_utils::session::SessionStore;

pub fn create_router(config: Arc<AppConfig>) -> Router {
    // One store so a login in /auth is visible to every other cell.
    let sessions = SessionStore::new();

    Router::new()
        .route("/", get(|| async { "OPD Connect API is running!" }))
        .nest("/auth", auth_routes(config.clone(), sessions.clone()))
        .nest("/locations", location_routes(config.clone()))
        .nest("/doctors", doctor_routes(config.clone()))
        .nest("/booking", booking_routes(config.clone(), sessions.clone()))
        .nest("/payments", payment_routes(config.clone(), sessions.clone()))
        .nest("/dashboard", dashboard_routes(config.clone(), sessions))
        .merge(content_routes(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use shared_utils::test_utils::TestConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn protected_cells_share_the_session_gate() {
        let app = create_router(TestConfig::default().to_arc());

        for uri in ["/dashboard/bookings", "/payments/reconciliation", "/auth/session"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let app = create_router(TestConfig::default().to_arc());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
