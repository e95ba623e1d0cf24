use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use doctor_cell::models::DoctorBookingMode;
use shared_backend::{endpoints, BackendClient, BackendError, Envelope};

use crate::models::{Inventory, Shift, Slot};

/// Shift and slot lookups for one doctor.
pub struct InventoryService {
    backend: BackendClient,
}

fn rows<T: serde::de::DeserializeOwned>(envelope: Envelope) -> Result<Vec<T>, BackendError> {
    match envelope.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => envelope.data_as(),
    }
}

impl InventoryService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn shifts(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<Shift>, BackendError> {
        debug!("Fetching OPD shifts for doctor {}", doctor_id);
        let envelope = self
            .backend
            .get(endpoints::DOCTOR_OPD_SHIFTS, &[("doctorId", doctor_id)], auth_token)
            .await?;
        rows(envelope)
    }

    pub async fn slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<Slot>, BackendError> {
        let date = date.format("%Y-%m-%d").to_string();
        debug!("Fetching slots for doctor {} on {}", doctor_id, date);
        let envelope = self
            .backend
            .get(
                endpoints::DOCTOR_SLOTS,
                &[("doctorId", doctor_id), ("date", date.as_str())],
                auth_token,
            )
            .await?;
        rows(envelope)
    }

    /// Shifts for token doctors, the day's slots for appointment doctors.
    pub async fn for_mode(
        &self,
        mode: DoctorBookingMode,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Inventory, BackendError> {
        match mode {
            DoctorBookingMode::Token { .. } => {
                self.shifts(doctor_id, auth_token).await.map(Inventory::Shifts)
            }
            DoctorBookingMode::Appointment { .. } => self
                .slots(doctor_id, date, auth_token)
                .await
                .map(Inventory::Slots),
        }
    }
}
