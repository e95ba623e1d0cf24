use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use doctor_cell::models::DoctorBookingMode;
use shared_backend::{endpoints, BackendClient, BackendError, Envelope};
use shared_models::error::AppError;
use shared_models::session::{NewSession, SessionContext, PATIENT_ROLE_ID};
use shared_utils::session::SessionStore;

use crate::models::{BookedBy, PatientDetails, SagaStep};

/// Everything one of the four booking endpoints needs.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub mode: DoctorBookingMode,
    pub booked_by: BookedBy,
    pub user_id: Option<String>,
    pub patient: PatientDetails,
    pub selection_id: String,
    pub booking_date: NaiveDate,
}

impl BookingRequest {
    pub fn endpoint(&self) -> &'static str {
        match (self.mode, self.booked_by) {
            (DoctorBookingMode::Token { .. }, BookedBy::Patient) => endpoints::BOOK_TOKEN,
            (DoctorBookingMode::Token { .. }, BookedBy::Doctor) => endpoints::BOOK_TOKEN_BY_DOCTOR,
            (DoctorBookingMode::Appointment { .. }, BookedBy::Patient) => endpoints::BOOK_APPOINTMENT,
            (DoctorBookingMode::Appointment { .. }, BookedBy::Doctor) => {
                endpoints::BOOK_APPOINTMENT_BY_DOCTOR
            }
        }
    }

    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("doctorId".to_string(), json!(self.doctor_id));
        body.insert("patientName".to_string(), json!(self.patient.name));
        body.insert("patientPhone".to_string(), json!(self.patient.phone));
        if let Some(email) = &self.patient.email {
            body.insert("patientEmail".to_string(), json!(email));
        }
        if let Some(gender) = &self.patient.gender {
            body.insert("patientGender".to_string(), json!(gender));
        }
        if let Some(age) = self.patient.age {
            body.insert("patientAge".to_string(), json!(age));
        }

        match self.mode {
            DoctorBookingMode::Token { .. } => {
                body.insert("shiftId".to_string(), json!(self.selection_id));
                body.insert(
                    "bookingDate".to_string(),
                    json!(self.booking_date.format("%Y-%m-%d").to_string()),
                );
                body.insert("bookedBy".to_string(), json!(self.booked_by.as_tag()));
            }
            DoctorBookingMode::Appointment { .. } => {
                if let Some(user_id) = &self.user_id {
                    body.insert("userId".to_string(), json!(user_id));
                }
                body.insert("slotId".to_string(), json!(self.selection_id));
                if self.booked_by == BookedBy::Doctor {
                    body.insert("bookedBy".to_string(), json!(self.booked_by.as_tag()));
                }
            }
        }

        Value::Object(body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingReceipt {
    pub token_number: Option<String>,
    pub booking_id: Option<String>,
}

impl BookingReceipt {
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            token_number: envelope.first_string(&["tokenNumber", "token_number", "token_no", "token"]),
            booking_id: envelope.first_string(&["bookingId", "booking_id", "appointmentId", "id"]),
        }
    }

    pub fn summary(&self) -> String {
        match (&self.token_number, &self.booking_id) {
            (Some(token), _) => format!("Your token number is {}", token),
            (None, Some(id)) => format!("Your booking id is {}", id),
            (None, None) => "Your booking is confirmed".to_string(),
        }
    }
}

pub async fn submit_booking(
    backend: &BackendClient,
    request: &BookingRequest,
    auth_token: Option<&str>,
) -> Result<BookingReceipt, BackendError> {
    let envelope = backend
        .post(request.endpoint(), request.payload(), auth_token)
        .await?;
    let receipt = BookingReceipt::from_envelope(&envelope);

    info!(
        "Booking confirmed for doctor {} via {} ({:?})",
        request.doctor_id,
        request.endpoint(),
        receipt
    );

    Ok(receipt)
}

#[derive(Debug)]
pub struct SagaReport {
    pub trail: Vec<SagaStep>,
    /// Session opened for a user registered during this run.
    pub created_session: Option<SessionContext>,
    pub result: Result<BookingReceipt, AppError>,
}

impl SagaReport {
    pub fn orphaned_registration(&self) -> bool {
        self.created_session.is_some() && self.result.is_err()
    }
}

/// Register-if-anonymous, then book.
pub struct BookingSaga {
    backend: BackendClient,
    sessions: SessionStore,
    placeholder_password: String,
}

impl BookingSaga {
    pub fn new(backend: BackendClient, sessions: SessionStore, placeholder_password: String) -> Self {
        Self {
            backend,
            sessions,
            placeholder_password,
        }
    }

    async fn register(&self, patient: &PatientDetails) -> Result<SessionContext, BackendError> {
        let body = json!({
            "name": patient.name,
            "phone": patient.phone,
            "email": patient.email,
            "gender": patient.gender,
            "password": self.placeholder_password,
        });

        let envelope = self.backend.post(endpoints::REGISTER_USER, body, None).await?;
        let user_id = envelope.first_string(&["userId", "user_id", "id"])
            .ok_or_else(|| BackendError::Decode("registration returned no user id".to_string()))?;

        info!("Registered new user {} during booking", user_id);

        let session = self
            .sessions
            .create(NewSession {
                user_id,
                user_name: patient.name.clone(),
                role_id: PATIENT_ROLE_ID.to_string(),
                auth_token: envelope.first_string(&["token", "accessToken"]).unwrap_or_default(),
                remembered_phone: None,
            })
            .await;

        Ok(session)
    }

    pub async fn run(&self, session: Option<SessionContext>, mut request: BookingRequest) -> SagaReport {
        let mut trail = Vec::new();
        let mut created_session = None;

        let acting = match session {
            Some(session) => session,
            None => {
                trail.push(SagaStep::Registering);
                match self.register(&request.patient).await {
                    Ok(session) => {
                        created_session = Some(session.clone());
                        session
                    }
                    Err(e) => {
                        warn!("Registration before booking failed: {}", e);
                        trail.push(SagaStep::Failed);
                        return SagaReport {
                            trail,
                            created_session,
                            result: Err(e.into()),
                        };
                    }
                }
            }
        };

        request.user_id = Some(acting.user_id.clone());
        trail.push(SagaStep::Booking);

        let auth_token = Some(acting.auth_token.as_str()).filter(|t| !t.is_empty());
        let result = match submit_booking(&self.backend, &request, auth_token).await {
            Ok(receipt) => {
                trail.push(SagaStep::Confirmed);
                Ok(receipt)
            }
            Err(e) => {
                if created_session.is_some() {
                    warn!(
                        "User {} was registered but booking failed: {}",
                        acting.user_id, e
                    );
                } else {
                    warn!("Booking failed for user {}: {}", acting.user_id, e);
                }
                trail.push(SagaStep::Failed);
                Err(e.into())
            }
        };

        SagaReport {
            trail,
            created_session,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: DoctorBookingMode, booked_by: BookedBy) -> BookingRequest {
        BookingRequest {
            doctor_id: "7".to_string(),
            mode,
            booked_by,
            user_id: Some("U1".to_string()),
            patient: PatientDetails {
                name: "Asha".to_string(),
                phone: "9876543210".to_string(),
                email: None,
                gender: Some("Female".to_string()),
                age: None,
            },
            selection_id: "2".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }
    }

    #[test]
    fn token_payload_carries_shift_and_tag() {
        let req = request(DoctorBookingMode::Token { horizon_days: None }, BookedBy::Patient);
        assert_eq!(req.endpoint(), endpoints::BOOK_TOKEN);

        let body = req.payload();
        assert_eq!(body["shiftId"], "2");
        assert_eq!(body["bookingDate"], "2025-03-10");
        assert_eq!(body["bookedBy"], "self");
        assert!(body.get("slotId").is_none());
        assert!(body.get("patientEmail").is_none());
    }

    #[test]
    fn appointment_payload_carries_user_and_slot() {
        let req = request(DoctorBookingMode::Appointment { horizon_days: Some(30) }, BookedBy::Patient);
        assert_eq!(req.endpoint(), endpoints::BOOK_APPOINTMENT);

        let body = req.payload();
        assert_eq!(body["userId"], "U1");
        assert_eq!(body["slotId"], "2");
        assert!(body.get("bookedBy").is_none());
    }

    #[test]
    fn doctor_bookings_use_staff_endpoints() {
        let token = request(DoctorBookingMode::Token { horizon_days: Some(3) }, BookedBy::Doctor);
        assert_eq!(token.endpoint(), endpoints::BOOK_TOKEN_BY_DOCTOR);
        assert_eq!(token.payload()["bookedBy"], "doctor");

        let appt = request(DoctorBookingMode::Appointment { horizon_days: None }, BookedBy::Doctor);
        assert_eq!(appt.endpoint(), endpoints::BOOK_APPOINTMENT_BY_DOCTOR);
    }

    #[test]
    fn receipt_reads_data_then_top_level() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": true, "message": "ok", "data": {"tokenNumber": 14}
        }))
        .unwrap();
        let receipt = BookingReceipt::from_envelope(&envelope);
        assert_eq!(receipt.token_number.as_deref(), Some("14"));
        assert_eq!(receipt.summary(), "Your token number is 14");

        let envelope: Envelope = serde_json::from_value(json!({
            "status": true, "message": "ok", "bookingId": "B-88"
        }))
        .unwrap();
        assert_eq!(BookingReceipt::from_envelope(&envelope).booking_id.as_deref(), Some("B-88"));
    }
}
