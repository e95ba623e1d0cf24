use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use shared_utils::session::SessionStore;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

fn create_test_app(uri: &str, sessions: SessionStore) -> Router {
    auth_routes(TestConfig::with_mock_server(uri).to_arc(), sessions)
}

async fn send(app: &Router, method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session_id) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", session_id));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn mount_login(mock_server: &MockServer, role_id: u32) {
    Mock::given(method("POST"))
        .and(path("/getToken"))
        .and(body_partial_json(json!({"phone": "9876543210", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!({
            "userId": 42, "name": "Dr. Meera", "roleId": role_id, "token": "backend-jwt"
        }))))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn doctor_login_redirects_to_doctor_dashboard() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 2).await;
    let sessions = SessionStore::new();
    let app = create_test_app(&mock_server.uri(), sessions.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"phone": "9876543210", "password": "secret1", "remember_me": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/doctor/dashboard");
    assert_eq!(body["user_id"], "42");
    assert_eq!(body["remembered_phone"], "9876543210");

    let session = sessions.load(body["session_id"].as_str().unwrap()).await.unwrap();
    assert_eq!(session.auth_token, "backend-jwt");
}

#[tokio::test]
async fn invalid_phone_never_reaches_backend() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!({}))))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri(), SessionStore::new());

    let (status, body) = send(&app, "POST", "/login", None, Some(json!({"phone": "98765abc10", "password": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "phone");
}

#[tokio::test]
async fn wrong_password_is_an_auth_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::rejected("Invalid credentials")))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri(), SessionStore::new());

    let (status, body) = send(&app, "POST", "/login", None, Some(json!({"phone": "9876543210", "password": "nope12"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn session_me_and_logout() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 1).await;
    Mock::given(method("GET"))
        .and(path("/getUserDetails"))
        .and(query_param("userId", "42"))
        .and(header("authorization", "Bearer backend-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!({
            "id": 42, "name": "Asha", "mobile": "9876543210", "role_id": 1
        }))))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri(), SessionStore::new());

    let (_, login) = send(&app, "POST", "/login", None, Some(json!({"phone": "9876543210", "password": "secret1"}))).await;
    assert_eq!(login["redirect"], "/user/dashboard");
    assert!(login["remembered_phone"].is_null());
    let session_id = login["session_id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", "/session", Some(session_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["user_id"], "42");
    assert!(body["session"].get("auth_token").is_none());

    let (_, me) = send(&app, "GET", "/me", Some(session_id), None).await;
    assert_eq!(me["phone"], "9876543210");
    assert_eq!(me["role"], "1");

    let (status, _) = send(&app, "POST", "/logout", Some(session_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "GET", "/session", Some(session_id), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
async fn password_reset_runs_in_order() {
    let mock_server = MockServer::start().await;
    for endpoint in ["/generateAndSendOtp", "/verify-otp"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!({}))))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/reset-password"))
        .and(body_partial_json(json!({"phone": "9876543210", "newPassword": "newpass1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!({}))))
        .expect(1)
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri(), SessionStore::new());
    let reset = json!({"phone": "9876543210", "new_password": "newpass1", "confirm_password": "newpass1"});

    // Skipping ahead is refused without a network call.
    let (status, _) = send(&app, "POST", "/password/reset", None, Some(reset.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", "/password/verify", None, Some(json!({"phone": "9876543210", "otp": "1234"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/password/otp", None, Some(json!({"phone": "9876543210"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "otp_sent");

    let (status, _) = send(&app, "POST", "/password/reset", None, Some(reset.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "POST", "/password/verify", None, Some(json!({"phone": "9876543210", "otp": "1234"}))).await;
    assert_eq!(body["step"], "verified");

    let (status, body) = send(
        &app,
        "POST",
        "/password/reset",
        None,
        Some(json!({"phone": "9876543210", "new_password": "newpass1", "confirm_password": "different"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "confirm_password");

    let (status, body) = send(&app, "POST", "/password/reset", None, Some(reset)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "reset");
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
async fn registration_surfaces_backend_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/registerUser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::rejected("Mobile number already registered")))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri(), SessionStore::new());

    let (status, body) = send(
        &app,
        "POST",
        "/register/user",
        None,
        Some(json!({"name": "Asha", "phone": "9876543210", "password": "secret1", "confirm_password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Mobile number already registered");
}
