use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::DoctorBookingMode;
use doctor_cell::services::directory::DoctorDirectoryService;
use shared_backend::{BackendClient, BackendError};
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::{SessionContext, USER_DASHBOARD_ROUTE};
use shared_utils::request_tracker::RequestTracker;
use shared_utils::session::SessionStore;
use shared_utils::validation::FieldValidator;

use crate::models::{
    BookedBy, BookingConfirmation, BookingFor, BookingWorkflow, DateBounds, Inventory,
    PatientDetails, PatientForm, SelectionOutcome, Shift, SubmissionOutcome, WorkflowState,
};
use crate::services::dates;
use crate::services::inventory::InventoryService;
use crate::services::submission::{BookingRequest, BookingSaga};

pub const SHIFTS_FAILED_MESSAGE: &str = "Unable to load shifts. Please try again.";
pub const SLOTS_FAILED_MESSAGE: &str = "Unable to load time slots. Please try again.";

/// Workflows older than this are dropped when a new one starts.
pub const WORKFLOW_TTL_MINUTES: i64 = 120;

#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    workflows: Arc<RwLock<HashMap<String, BookingWorkflow>>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, workflow_id: &str) -> Result<BookingWorkflow, AppError> {
        self.workflows
            .read()
            .await
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Store `workflow`, sweeping expired ones. Returns the ids swept.
    async fn put(&self, workflow: BookingWorkflow) -> Vec<String> {
        let cutoff = Utc::now() - Duration::minutes(WORKFLOW_TTL_MINUTES);
        let mut workflows = self.workflows.write().await;
        let expired: Vec<String> = workflows
            .values()
            .filter(|w| w.created_at < cutoff)
            .map(|w| w.workflow_id.clone())
            .collect();
        for workflow_id in &expired {
            workflows.remove(workflow_id);
        }
        workflows.insert(workflow.workflow_id.clone(), workflow);
        expired
    }

    async fn update<F>(&self, workflow_id: &str, f: F) -> Result<BookingWorkflow, AppError>
    where
        F: FnOnce(&mut BookingWorkflow),
    {
        let mut workflows = self.workflows.write().await;
        let workflow = workflows
            .get_mut(workflow_id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        f(workflow);
        Ok(workflow.clone())
    }
}

/// A submission that got past validation but did not end in a booking.
#[derive(Debug)]
pub struct SubmissionFailure {
    pub error: AppError,
    pub outcome: Option<SubmissionOutcome>,
}

impl From<AppError> for SubmissionFailure {
    fn from(error: AppError) -> Self {
        Self { error, outcome: None }
    }
}

pub struct BookingWorkflowService {
    backend: BackendClient,
    registry: WorkflowRegistry,
    tracker: RequestTracker,
    sessions: SessionStore,
    placeholder_password: String,
}

impl BookingWorkflowService {
    pub fn new(
        backend: BackendClient,
        registry: WorkflowRegistry,
        tracker: RequestTracker,
        sessions: SessionStore,
        placeholder_password: String,
    ) -> Self {
        Self {
            backend,
            registry,
            tracker,
            sessions,
            placeholder_password,
        }
    }

    fn inventory(&self) -> InventoryService {
        InventoryService::with_client(self.backend.clone())
    }

    pub async fn start(&self, doctor_id: &str, today: NaiveDate) -> Result<BookingWorkflow, AppError> {
        let directory = DoctorDirectoryService::with_client(self.backend.clone());
        let doctor = directory.doctor_by_id(doctor_id, None).await?;
        let mode = doctor.booking_mode();

        let mut workflow = BookingWorkflow {
            workflow_id: Uuid::new_v4().to_string(),
            bounds: dates::patient_bounds(mode, today),
            mode,
            state: WorkflowState::LoadingDoctor,
            date: None,
            inventory: None,
            selected_id: None,
            off_day_offer: None,
            last_error: None,
            confirmation: None,
            created_at: Utc::now(),
            doctor,
        };

        match mode {
            DoctorBookingMode::Token { .. } => {
                // The patient books for today unless today is the doctor's off-day.
                match dates::off_day_offer(&workflow.doctor, today, &workflow.bounds) {
                    Some(offer) => {
                        debug!("Doctor {} is off today, suggesting {}", doctor_id, offer.suggested);
                        workflow.off_day_offer = Some(offer);
                        workflow.state = WorkflowState::Ready;
                    }
                    None => {
                        workflow.date = Some(today);
                        let fetched = self.inventory().shifts(doctor_id, None).await;
                        apply_shifts(&mut workflow, fetched);
                    }
                }
            }
            DoctorBookingMode::Appointment { .. } => {
                workflow.state = WorkflowState::Ready;
            }
        }

        info!(
            "Booking workflow {} started for doctor {} ({:?})",
            workflow.workflow_id, doctor_id, mode
        );
        let expired = self.registry.put(workflow.clone()).await;
        if !expired.is_empty() {
            debug!("Dropped {} expired booking workflows", expired.len());
        }
        for workflow_id in &expired {
            self.tracker.forget(workflow_id).await;
        }

        Ok(workflow)
    }

    pub async fn get(&self, workflow_id: &str) -> Result<BookingWorkflow, AppError> {
        self.registry.get(workflow_id).await
    }

    fn ensure_editable(workflow: &BookingWorkflow) -> Result<(), AppError> {
        match workflow.state {
            WorkflowState::Submitting => Err(AppError::Conflict(
                "Your booking is being submitted. Please wait.".to_string(),
            )),
            WorkflowState::Done => Err(AppError::Conflict(
                "This booking is already confirmed".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub async fn choose_date(
        &self,
        workflow_id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<BookingWorkflow, AppError> {
        let workflow = self
            .registry
            .update(workflow_id, |w| w.bounds = dates::patient_bounds(w.mode, today))
            .await?;
        Self::ensure_editable(&workflow)?;

        if !workflow.bounds.contains(date) {
            return Err(out_of_bounds(&workflow.bounds));
        }

        if let Some(offer) = dates::off_day_offer(&workflow.doctor, date, &workflow.bounds) {
            debug!(
                "Workflow {}: {} is an off-day, suggesting {}",
                workflow_id, date, offer.suggested
            );
            return self
                .registry
                .update(workflow_id, |w| {
                    if w.date == Some(date) {
                        w.date = None;
                        w.selected_id = None;
                    }
                    w.off_day_offer = Some(offer);
                })
                .await;
        }

        self.apply_date(workflow_id, date).await
    }

    async fn apply_date(&self, workflow_id: &str, date: NaiveDate) -> Result<BookingWorkflow, AppError> {
        let workflow = self
            .registry
            .update(workflow_id, |w| {
                if w.date != Some(date) {
                    w.selected_id = None;
                }
                w.date = Some(date);
                w.off_day_offer = None;
                if let DoctorBookingMode::Appointment { .. } = w.mode {
                    // Nothing is selectable until this date's slots land.
                    w.inventory = None;
                    w.state = WorkflowState::Ready;
                }
            })
            .await?;

        if let DoctorBookingMode::Token { .. } = workflow.mode {
            if workflow.inventory.is_some() {
                return Ok(workflow);
            }
            let fetched = self.inventory().shifts(&workflow.doctor.id, None).await;
            return self
                .registry
                .update(workflow_id, |w| apply_shifts(w, fetched))
                .await;
        }

        let ticket = self.tracker.issue(workflow_id).await;
        let fetched = self.inventory().slots(&workflow.doctor.id, date, None).await;

        if !self.tracker.is_current(&ticket).await {
            // A later date change owns the inventory.
            return self.registry.get(workflow_id).await;
        }

        match fetched {
            Ok(slots) => {
                self.registry
                    .update(workflow_id, |w| {
                        let inventory = Inventory::Slots(slots);
                        if let Some(selected) = w.selected_id.as_deref() {
                            if inventory.classify(selected) != SelectionOutcome::Selected {
                                w.selected_id = None;
                            }
                        }
                        w.inventory = Some(inventory);
                        w.state = WorkflowState::SelectingShift;
                        w.last_error = None;
                    })
                    .await
            }
            Err(e) => {
                warn!("Slot fetch failed for workflow {}: {}", workflow_id, e);
                self.registry
                    .update(workflow_id, |w| {
                        w.inventory = None;
                        w.selected_id = None;
                        w.state = WorkflowState::Error;
                        w.last_error = Some(SLOTS_FAILED_MESSAGE.to_string());
                    })
                    .await
            }
        }
    }

    pub async fn resolve_off_day(
        &self,
        workflow_id: &str,
        accept: bool,
        today: NaiveDate,
    ) -> Result<BookingWorkflow, AppError> {
        let workflow = self.registry.get(workflow_id).await?;
        Self::ensure_editable(&workflow)?;

        let offer = workflow
            .off_day_offer
            .clone()
            .ok_or_else(|| AppError::Conflict("There is no date suggestion to answer".to_string()))?;

        if !accept {
            return self
                .registry
                .update(workflow_id, |w| w.off_day_offer = None)
                .await;
        }

        let bounds = dates::patient_bounds(workflow.mode, today);
        if !bounds.contains(offer.suggested) {
            self.registry
                .update(workflow_id, |w| w.off_day_offer = None)
                .await?;
            return Err(out_of_bounds(&bounds));
        }

        self.apply_date(workflow_id, offer.suggested).await
    }

    pub async fn select(&self, workflow_id: &str, entry_id: &str) -> Result<BookingWorkflow, AppError> {
        let mut outcome = SelectionOutcome::Unknown;
        let mut blocked = None;

        let workflow = self
            .registry
            .update(workflow_id, |w| match Self::ensure_editable(w) {
                Ok(()) => outcome = w.select(entry_id),
                Err(e) => blocked = Some(e),
            })
            .await?;

        if let Some(e) = blocked {
            return Err(e);
        }

        match outcome {
            SelectionOutcome::Selected => Ok(workflow),
            SelectionOutcome::IgnoredBooked => {
                debug!("Workflow {}: ignored booked slot {}", workflow_id, entry_id);
                Ok(workflow)
            }
            SelectionOutcome::Unknown => Err(AppError::BadRequest(format!(
                "{} is not available for this date",
                entry_id
            ))),
        }
    }

    fn validate(
        workflow: &BookingWorkflow,
        form: &PatientForm,
        session: Option<&SessionContext>,
    ) -> Result<PatientDetails, AppError> {
        let mut patient_name = form.patient_name.trim().to_string();
        if patient_name.is_empty() && form.booking_for == BookingFor::Myself {
            if let Some(session) = session {
                patient_name = session.user_name.clone();
            }
        }
        let phone = form.patient_phone.trim().to_string();
        let email = form
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let selection_message = match workflow.mode {
            DoctorBookingMode::Token { .. } => "Please select a shift",
            DoctorBookingMode::Appointment { .. } => "Please select a time slot",
        };

        FieldValidator::new()
            .check(workflow.date.is_some(), "date", "Please choose a date")
            .check(workflow.selected_id.is_some(), "selection", selection_message)
            .required("patient_name", &patient_name, "Patient name")
            .phone("patient_phone", &phone)
            .optional_email("email", email.as_deref())
            .finish()?;

        Ok(PatientDetails {
            name: patient_name,
            phone,
            email,
            gender: form
                .gender
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            age: None,
        })
    }

    pub async fn submit(
        &self,
        workflow_id: &str,
        form: PatientForm,
        session: Option<SessionContext>,
    ) -> Result<SubmissionOutcome, SubmissionFailure> {
        let snapshot = self.registry.get(workflow_id).await?;
        Self::ensure_editable(&snapshot)?;
        let patient = Self::validate(&snapshot, &form, session.as_ref())?;

        let mut claimed = false;
        let workflow = self
            .registry
            .update(workflow_id, |w| {
                if Self::ensure_editable(w).is_ok() {
                    w.state = WorkflowState::Submitting;
                    claimed = true;
                }
            })
            .await?;
        if !claimed {
            Self::ensure_editable(&workflow)?;
        }

        let (Some(booking_date), Some(selection_id)) = (workflow.date, workflow.selected_id.clone())
        else {
            return Err(AppError::Internal("workflow lost its selection".to_string()).into());
        };

        let request = BookingRequest {
            doctor_id: workflow.doctor.id.clone(),
            mode: workflow.mode,
            booked_by: BookedBy::Patient,
            user_id: None,
            patient,
            selection_id,
            booking_date,
        };

        let saga = BookingSaga::new(
            self.backend.clone(),
            self.sessions.clone(),
            self.placeholder_password.clone(),
        );
        let report = saga.run(session, request).await;
        let orphaned_registration = report.orphaned_registration();
        let session_id = report.created_session.as_ref().map(|s| s.session_id.clone());

        match report.result {
            Ok(receipt) => {
                let confirmation = BookingConfirmation {
                    token_number: receipt.token_number.clone(),
                    booking_id: receipt.booking_id.clone(),
                    doctor_name: workflow.doctor.name.clone(),
                    booking_date,
                    selection_label: workflow.selection_label(),
                };

                self.registry
                    .update(workflow_id, |w| {
                        w.state = WorkflowState::Done;
                        w.last_error = None;
                        w.confirmation = Some(confirmation.clone());
                    })
                    .await?;
                self.tracker.forget(workflow_id).await;

                info!("Workflow {} confirmed", workflow_id);

                Ok(SubmissionOutcome {
                    saga: report.trail,
                    confirmation: Some(confirmation),
                    notice: Notice::success("Booking confirmed", receipt.summary()),
                    redirect: Some(USER_DASHBOARD_ROUTE.to_string()),
                    session_id,
                    orphaned_registration: false,
                })
            }
            Err(error) => {
                let message = error.user_message();
                self.registry
                    .update(workflow_id, |w| {
                        w.state = WorkflowState::Error;
                        w.last_error = Some(message.clone());
                    })
                    .await?;

                let notice = if orphaned_registration {
                    Notice::warning(
                        "Booking not completed",
                        format!(
                            "Your account was created but the booking failed: {}. Please try booking again.",
                            message
                        ),
                    )
                } else {
                    Notice::error("Booking failed", message)
                };

                Err(SubmissionFailure {
                    error,
                    outcome: Some(SubmissionOutcome {
                        saga: report.trail,
                        confirmation: None,
                        notice,
                        redirect: None,
                        session_id,
                        orphaned_registration,
                    }),
                })
            }
        }
    }
}

fn apply_shifts(workflow: &mut BookingWorkflow, fetched: Result<Vec<Shift>, BackendError>) {
    match fetched {
        Ok(shifts) => {
            workflow.inventory = Some(Inventory::Shifts(shifts));
            workflow.state = WorkflowState::SelectingShift;
            workflow.last_error = None;
        }
        Err(e) => {
            warn!("Shift fetch failed for doctor {}: {}", workflow.doctor.id, e);
            workflow.state = WorkflowState::Error;
            workflow.last_error = Some(SHIFTS_FAILED_MESSAGE.to_string());
        }
    }
}

fn out_of_bounds(bounds: &DateBounds) -> AppError {
    if bounds.min == bounds.max {
        AppError::BadRequest(format!("Bookings are only available for {}", bounds.min))
    } else {
        AppError::BadRequest(format!(
            "Please choose a date between {} and {}",
            bounds.min, bounds.max
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use doctor_cell::models::Doctor;
    use serde_json::json;

    fn workflow(id: &str, age_minutes: i64) -> BookingWorkflow {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 3, "name": "Dr. B", "is_token": false, "appointment_booking_days": 7
        }))
        .unwrap();
        let today = Utc::now().date_naive();
        let mode = doctor.booking_mode();
        BookingWorkflow {
            workflow_id: id.to_string(),
            bounds: dates::patient_bounds(mode, today),
            mode,
            state: WorkflowState::Ready,
            date: None,
            inventory: None,
            selected_id: None,
            off_day_offer: None,
            last_error: None,
            confirmation: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            doctor,
        }
    }

    #[tokio::test]
    async fn expired_workflows_are_swept_on_insert() {
        let registry = WorkflowRegistry::new();
        assert!(registry.put(workflow("old", WORKFLOW_TTL_MINUTES + 1)).await.is_empty());
        assert_eq!(registry.put(workflow("recent", 5)).await, vec!["old".to_string()]);

        assert_matches!(registry.get("old").await, Err(AppError::NotFound(_)));
        assert!(registry.get("recent").await.is_ok());
    }

    #[test]
    fn shift_fetch_failure_marks_the_workflow() {
        let mut w = workflow("w", 0);
        apply_shifts(&mut w, Err(BackendError::Decode("no shifts".to_string())));
        assert_eq!(w.state, WorkflowState::Error);
        assert_eq!(w.last_error.as_deref(), Some(SHIFTS_FAILED_MESSAGE));
        assert!(w.inventory.is_none());
    }
}

