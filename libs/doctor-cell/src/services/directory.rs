use serde_json::Value;
use tracing::debug;

use shared_backend::{endpoints, BackendClient, BackendError};
use shared_config::AppConfig;

use crate::models::{Doctor, Hospital, Specialization};

pub struct DoctorDirectoryService {
    backend: BackendClient,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn doctors_by_district(&self, district_id: &str) -> Result<Vec<Doctor>, BackendError> {
        debug!("Fetching doctors for district {}", district_id);

        let envelope = self
            .backend
            .get(endpoints::DOCTORS_BY_DISTRICT, &[("districtId", district_id)], None)
            .await?;

        if envelope.data.as_ref().map(Value::is_null).unwrap_or(true) {
            return Ok(Vec::new());
        }

        envelope.data_as()
    }

    /// The backend answers either a single object or a one-element array.
    pub async fn doctor_by_id(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Doctor, BackendError> {
        debug!("Fetching doctor profile {}", doctor_id);

        let envelope = self
            .backend
            .get(endpoints::DOCTOR_BY_ID, &[("doctorId", doctor_id)], auth_token)
            .await?;

        let data = match envelope.data {
            Some(Value::Array(mut rows)) if !rows.is_empty() => rows.swap_remove(0),
            Some(Value::Object(map)) => Value::Object(map),
            _ => return Err(BackendError::Rejected("Doctor not found".to_string())),
        };

        serde_json::from_value(data).map_err(|e| BackendError::Decode(e.to_string()))
    }

    pub async fn specializations(&self) -> Result<Vec<Specialization>, BackendError> {
        let envelope = self.backend.get(endpoints::SPECIALIZATIONS, &[], None).await?;
        envelope.data_as()
    }

    pub async fn hospitals(&self) -> Result<Vec<Hospital>, BackendError> {
        let envelope = self.backend.get(endpoints::HOSPITAL_LIST, &[], None).await?;
        envelope.data_as()
    }
}
