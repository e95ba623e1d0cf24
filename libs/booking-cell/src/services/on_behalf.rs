use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use doctor_cell::models::{Doctor, DoctorBookingMode};
use doctor_cell::services::directory::DoctorDirectoryService;
use shared_backend::BackendClient;
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::SessionContext;
use shared_utils::validation::FieldValidator;

use crate::models::{
    BookedBy, BookingConfirmation, DateBounds, Inventory, OnBehalfForm, PatientDetails, SagaStep,
    SelectionOutcome, SubmissionOutcome,
};
use crate::services::dates;
use crate::services::inventory::InventoryService;
use crate::services::submission::{submit_booking, BookingRequest};

pub const MAX_PATIENT_AGE: u32 = 130;

#[derive(Debug, Clone, Serialize)]
pub struct StaffInventory {
    pub doctor_id: String,
    pub mode: DoctorBookingMode,
    pub date: NaiveDate,
    pub bounds: DateBounds,
    pub inventory: Inventory,
}

/// Bookings a doctor makes for walk-in or phone patients. No registration,
/// no payment and no off-day gate.
pub struct OnBehalfBookingService {
    backend: BackendClient,
}

impl OnBehalfBookingService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    async fn own_profile(&self, session: &SessionContext) -> Result<Doctor, AppError> {
        let directory = DoctorDirectoryService::with_client(self.backend.clone());
        let doctor = directory
            .doctor_by_id(&session.user_id, Some(&session.auth_token))
            .await?;
        Ok(doctor)
    }

    fn checked_date(
        doctor: &Doctor,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DateBounds, AppError> {
        let bounds = dates::staff_bounds(doctor.booking_mode(), today);
        if bounds.contains(date) {
            Ok(bounds)
        } else {
            Err(AppError::BadRequest(format!(
                "Please choose a date between {} and {}",
                bounds.min, bounds.max
            )))
        }
    }

    pub async fn inventory(
        &self,
        session: &SessionContext,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<StaffInventory, AppError> {
        let doctor = self.own_profile(session).await?;
        let date = date.unwrap_or(today);
        let bounds = Self::checked_date(&doctor, date, today)?;
        let mode = doctor.booking_mode();

        let inventory = InventoryService::with_client(self.backend.clone())
            .for_mode(mode, &doctor.id, date, Some(&session.auth_token))
            .await?;

        Ok(StaffInventory {
            doctor_id: doctor.id,
            mode,
            date,
            bounds,
            inventory,
        })
    }

    pub async fn book(
        &self,
        session: &SessionContext,
        form: OnBehalfForm,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, AppError> {
        let name = form.patient_name.trim().to_string();
        let phone = form.patient_phone.trim().to_string();

        FieldValidator::new()
            .required("patient_name", &name, "Patient name")
            .phone("patient_phone", &phone)
            .range("patient_age", form.patient_age, 0, MAX_PATIENT_AGE, "Age")
            .check(!form.selection_id.trim().is_empty(), "selection", "Please select a shift or time slot")
            .finish()?;

        let doctor = self.own_profile(session).await?;
        Self::checked_date(&doctor, form.date, today)?;
        let mode = doctor.booking_mode();

        // Re-read the inventory so a slot booked meanwhile is refused here
        // rather than by the backend.
        let inventory = InventoryService::with_client(self.backend.clone())
            .for_mode(mode, &doctor.id, form.date, Some(&session.auth_token))
            .await?;

        match inventory.classify(&form.selection_id) {
            SelectionOutcome::Selected => {}
            SelectionOutcome::IgnoredBooked => {
                return Err(AppError::Conflict("This time slot is already booked".to_string()))
            }
            SelectionOutcome::Unknown => {
                return Err(AppError::BadRequest(format!(
                    "{} is not available for this date",
                    form.selection_id
                )))
            }
        }

        let request = BookingRequest {
            doctor_id: doctor.id.clone(),
            mode,
            booked_by: BookedBy::Doctor,
            user_id: None,
            patient: PatientDetails {
                name,
                phone,
                email: None,
                gender: form.patient_gender.filter(|g| !g.trim().is_empty()),
                age: form.patient_age,
            },
            selection_id: form.selection_id.clone(),
            booking_date: form.date,
        };

        let receipt = submit_booking(&self.backend, &request, Some(&session.auth_token)).await?;
        info!("Doctor {} booked {} for a patient", doctor.id, form.selection_id);

        Ok(SubmissionOutcome {
            saga: vec![SagaStep::Booking, SagaStep::Confirmed],
            notice: Notice::success("Booking confirmed", receipt.summary()),
            confirmation: Some(BookingConfirmation {
                token_number: receipt.token_number,
                booking_id: receipt.booking_id,
                doctor_name: doctor.name,
                booking_date: form.date,
                selection_label: inventory.label(&form.selection_id),
            }),
            redirect: None,
            session_id: None,
            orphaned_registration: false,
        })
    }
}
