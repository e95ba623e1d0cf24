use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::session::{NewSession, SessionContext, DOCTOR_ROLE_ID, PATIENT_ROLE_ID};

use crate::session::SessionStore;

pub struct TestConfig {
    pub backend_base_url: String,
    pub payment_order_url: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub default_state_id: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8081".to_string(),
            payment_order_url: "http://localhost:8081/payments/create-order".to_string(),
            payment_key_id: "rzp_test_key".to_string(),
            payment_key_secret: String::new(),
            default_state_id: None,
        }
    }
}

impl TestConfig {
    /// Point both the backend and the payment proxy at a mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            backend_base_url: uri.to_string(),
            payment_order_url: format!("{}/payments/create-order", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_base_url: self.backend_base_url.clone(),
            backend_timeout_secs: 5,
            payment_order_url: self.payment_order_url.clone(),
            payment_key_id: self.payment_key_id.clone(),
            payment_key_secret: self.payment_key_secret.clone(),
            payment_currency: "INR".to_string(),
            default_state_id: self.default_state_id.clone(),
            completed_status_id: "5".to_string(),
            registration_placeholder_password: "Welcome@123".to_string(),
            support_contact: "support@example.com".to_string(),
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestSessions;

impl TestSessions {
    pub async fn doctor(store: &SessionStore, doctor_id: &str) -> SessionContext {
        store
            .create(NewSession {
                user_id: doctor_id.to_string(),
                user_name: "Dr. Test".to_string(),
                role_id: DOCTOR_ROLE_ID.to_string(),
                auth_token: "doctor-backend-token".to_string(),
                remembered_phone: None,
            })
            .await
    }

    pub async fn patient(store: &SessionStore, user_id: &str) -> SessionContext {
        store
            .create(NewSession {
                user_id: user_id.to_string(),
                user_name: "Test Patient".to_string(),
                role_id: PATIENT_ROLE_ID.to_string(),
                auth_token: "patient-backend-token".to_string(),
                remembered_phone: None,
            })
            .await
    }

    pub fn bearer(session: &SessionContext) -> String {
        format!("Bearer {}", session.session_id)
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn ok(data: Value) -> Value {
        json!({
            "status": true,
            "message": "Success",
            "data": data
        })
    }

    pub fn rejected(message: &str) -> Value {
        json!({
            "status": false,
            "message": message
        })
    }

    pub fn doctor_response(id: &str, is_token: bool, week_off: &str) -> Value {
        json!({
            "id": id,
            "name": "Dr. Meera Kulkarni",
            "gender": "Female",
            "photo": null,
            "fee": "500",
            "token_fee": "100",
            "professional_details": {
                "specialization": "Cardiology",
                "qualification": "MBBS, MD",
                "experience": "12"
            },
            "hospital_details": {
                "name": "City Care Hospital",
                "address_line1": "12 MG Road",
                "address_line2": null,
                "landmark": "Near Bus Stand"
            },
            "is_token": is_token,
            "is_fees_online": false,
            "is_appointment": !is_token,
            "week_off": week_off,
            "token_booking_days": 3,
            "appointment_booking_days": 30,
            "review_percentage": "92"
        })
    }

    pub fn shifts_response() -> Value {
        Self::ok(json!([
            {"id": 1, "name": "Morning"},
            {"id": 2, "name": "Evening"}
        ]))
    }

    pub fn slots_response(date: &str) -> Value {
        Self::ok(json!([
            {"id": 11, "start_time": format!("{} 10:00", date), "end_time": format!("{} 10:15", date), "isBooked": false},
            {"id": 12, "start_time": format!("{} 10:15", date), "end_time": format!("{} 10:30", date), "isBooked": true},
            {"id": 13, "start_time": format!("{} 10:30", date), "end_time": format!("{} 10:45", date), "isBooked": false}
        ]))
    }

    pub fn status_list_response() -> Value {
        Self::ok(json!([
            {"id": 1, "name": "Booked"},
            {"id": 2, "name": "Checked_In"},
            {"id": 3, "name": "Waiting"},
            {"id": 4, "name": "With_Doctor"},
            {"id": 5, "name": "Completed"},
            {"id": 6, "name": "Cancelled"},
            {"id": 7, "name": "Missed"}
        ]))
    }
}
