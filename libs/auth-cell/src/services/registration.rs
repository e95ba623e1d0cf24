use serde_json::{json, Map, Value};
use tracing::info;

use shared_backend::{endpoints, BackendClient};
use shared_models::error::{AppError, LOGIN_ROUTE};
use shared_models::notice::Notice;
use shared_utils::validation::FieldValidator;

use crate::models::{RegisterDoctorRequest, RegisterUserRequest, RegistrationOutcome};

const PASSWORD_MISMATCH: &str = "Passwords do not match";

fn insert_opt(body: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        body.insert(key.to_string(), Value::String(v.to_string()));
    }
}

pub struct RegistrationService {
    backend: BackendClient,
}

impl RegistrationService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn register_user(&self, request: RegisterUserRequest) -> Result<RegistrationOutcome, AppError> {
        FieldValidator::new()
            .required("name", &request.name, "Name")
            .phone("phone", request.phone.trim())
            .optional_email("email", request.email.as_deref())
            .password("password", &request.password)
            .matches("confirm_password", &request.confirm_password, &request.password, PASSWORD_MISMATCH)
            .finish()?;

        let mut body = Map::new();
        body.insert("name".to_string(), json!(request.name.trim()));
        body.insert("phone".to_string(), json!(request.phone.trim()));
        body.insert("password".to_string(), json!(request.password));
        insert_opt(&mut body, "email", request.email.as_deref());
        insert_opt(&mut body, "gender", request.gender.as_deref());

        let envelope = self
            .backend
            .post(endpoints::REGISTER_USER, Value::Object(body), None)
            .await?;
        let user_id = envelope.first_string(&["userId", "user_id", "id"]);

        info!("Registered user {:?}", user_id);

        Ok(RegistrationOutcome {
            user_id,
            notice: Notice::success("Registration successful", envelope.message_or("Please log in to continue.")),
            redirect: LOGIN_ROUTE.to_string(),
        })
    }

    pub async fn register_doctor(&self, request: RegisterDoctorRequest) -> Result<RegistrationOutcome, AppError> {
        FieldValidator::new()
            .required("name", &request.name, "Name")
            .phone("phone", request.phone.trim())
            .email("email", request.email.trim())
            .password("password", &request.password)
            .matches("confirm_password", &request.confirm_password, &request.password, PASSWORD_MISMATCH)
            .finish()?;

        let mut body = Map::new();
        body.insert("name".to_string(), json!(request.name.trim()));
        body.insert("phone".to_string(), json!(request.phone.trim()));
        body.insert("email".to_string(), json!(request.email.trim()));
        body.insert("password".to_string(), json!(request.password));
        insert_opt(&mut body, "gender", request.gender.as_deref());
        insert_opt(&mut body, "specializationId", request.specialization_id.as_deref());
        insert_opt(&mut body, "hospitalId", request.hospital_id.as_deref());
        insert_opt(&mut body, "districtId", request.district_id.as_deref());
        insert_opt(&mut body, "qualification", request.qualification.as_deref());
        if let Some(years) = request.experience {
            body.insert("experience".to_string(), json!(years));
        }

        let envelope = self
            .backend
            .post(endpoints::REGISTER_DOCTOR, Value::Object(body), None)
            .await?;
        let user_id = envelope.first_string(&["doctorId", "userId", "user_id", "id"]);

        info!("Registered doctor {:?}", user_id);

        Ok(RegistrationOutcome {
            user_id,
            notice: Notice::success(
                "Registration successful",
                envelope.message_or("Your doctor account has been created. Please log in."),
            ),
            redirect: LOGIN_ROUTE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_are_left_out() {
        let mut body = Map::new();
        insert_opt(&mut body, "email", Some("  "));
        insert_opt(&mut body, "gender", None);
        insert_opt(&mut body, "districtId", Some(" 12 "));
        assert_eq!(Value::Object(body), json!({"districtId": "12"}));
    }
}
