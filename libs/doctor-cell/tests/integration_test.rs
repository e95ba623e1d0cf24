use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

fn create_test_app(uri: &str) -> Router {
    doctor_routes(TestConfig::with_mock_server(uri).to_arc())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn district_roster() -> Value {
    let mut a = MockBackendResponses::doctor_response("1", true, "Sunday");
    a["name"] = json!("Dr. Anil Rao");
    a["gender"] = json!("Male");
    a["fee"] = json!("800");

    let mut b = MockBackendResponses::doctor_response("2", false, "Monday");
    b["name"] = json!("Dr. Bina Shah");
    b["fee"] = json!(300);
    b["professional_details"]["specialization"] = json!("Dermatology");

    let mut c = MockBackendResponses::doctor_response("3", false, "Friday");
    c["name"] = json!("Dr. Chitra Rao");
    c["fee"] = json!("not set");

    MockBackendResponses::ok(json!([a, b, c]))
}

async fn mount_district(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/getDoctorsByDistrict"))
        .and(query_param("districtId", "401"))
        .respond_with(ResponseTemplate::new(200).set_body_json(district_roster()))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn search_requires_district() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select a district");
}

#[tokio::test]
async fn search_filters_and_sorts_in_memory() {
    let mock_server = MockServer::start().await;
    mount_district(&mock_server).await;
    let app = create_test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/?district_id=401&name=rao&sort=fee_asc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unfiltered_total"], 3);
    assert_eq!(body["total"], 2);
    assert_eq!(body["doctors"][0]["id"], "3");
    assert_eq!(body["doctors"][1]["id"], "1");
    assert_eq!(body["doctors"][1]["booking_mode"]["mode"], "token");
}

#[tokio::test]
async fn search_by_specialization_and_gender() {
    let mock_server = MockServer::start().await;
    mount_district(&mock_server).await;
    let app = create_test_app(&mock_server.uri());

    let (status, body) = get_json(
        &app,
        "/?district_id=401&specialization=Cardiology&gender=female&min_review=90",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["doctors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["3"]);
}

#[tokio::test]
async fn doctor_profile_accepts_array_payload() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getDoctorsById"))
        .and(query_param("doctorId", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!([
            MockBackendResponses::doctor_response("9", false, "Sunday")
        ]))))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "9");
    assert_eq!(body["booking_mode"]["mode"], "appointment");
    assert_eq!(body["booking_mode"]["horizon_days"], 30);
    assert_eq!(body["experience_years"], 12.0);
}

#[tokio::test]
async fn backend_rejection_is_surfaced_verbatim() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getDoctorsById"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::rejected("Doctor is inactive")))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/77").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Doctor is inactive");
}

#[tokio::test]
async fn transport_failure_gives_generic_message() {
    // Nothing listens on this port.
    let app = create_test_app("http://127.0.0.1:9");

    let (status, body) = get_json(&app, "/specializations").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Something went wrong. Please try again.");
}

#[tokio::test]
async fn specializations_and_hospitals_proxy_backend() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getSpecializations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!([
            {"id": 1, "specialization": "Cardiology"}
        ]))))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getHospitalList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::ok(json!([
            {"id": 3, "hospital_name": "City Care", "city": "Pune"}
        ]))))
        .mount(&mock_server)
        .await;
    let app = create_test_app(&mock_server.uri());

    let (_, specs) = get_json(&app, "/specializations").await;
    assert_eq!(specs["specializations"][0]["name"], "Cardiology");

    let (_, hospitals) = get_json(&app, "/hospitals").await;
    assert_eq!(hospitals["hospitals"][0]["name"], "City Care");
    assert_eq!(hospitals["hospitals"][0]["city"], "Pune");
}
