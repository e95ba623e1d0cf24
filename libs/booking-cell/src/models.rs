use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use doctor_cell::models::{Doctor, DoctorBookingMode};
use shared_models::loose::{id_string, loose_bool};
use shared_models::notice::Notice;

// ==============================================================================
// INVENTORY
// ==============================================================================

/// Named block of a token doctor's day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shift {
    #[serde(deserialize_with = "id_string", alias = "shift_id", alias = "shiftId")]
    pub id: String,
    #[serde(alias = "shift_name", alias = "shiftName")]
    pub name: String,
}

/// Timed interval of an appointment doctor's day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    #[serde(deserialize_with = "id_string", alias = "slot_id", alias = "slotId")]
    pub id: String,
    #[serde(alias = "startTime")]
    pub start_time: String,
    #[serde(alias = "endTime")]
    pub end_time: String,
    #[serde(default, alias = "isBooked", deserialize_with = "loose_bool")]
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Inventory {
    Shifts(Vec<Shift>),
    Slots(Vec<Slot>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected,
    /// A booked slot was clicked; nothing changes.
    IgnoredBooked,
    Unknown,
}

impl Inventory {
    pub fn classify(&self, entry_id: &str) -> SelectionOutcome {
        match self {
            Inventory::Shifts(shifts) => {
                if shifts.iter().any(|s| s.id == entry_id) {
                    SelectionOutcome::Selected
                } else {
                    SelectionOutcome::Unknown
                }
            }
            Inventory::Slots(slots) => match slots.iter().find(|s| s.id == entry_id) {
                Some(slot) if slot.is_booked => SelectionOutcome::IgnoredBooked,
                Some(_) => SelectionOutcome::Selected,
                None => SelectionOutcome::Unknown,
            },
        }
    }

    pub fn label(&self, entry_id: &str) -> Option<String> {
        match self {
            Inventory::Shifts(shifts) => shifts
                .iter()
                .find(|s| s.id == entry_id)
                .map(|s| s.name.clone()),
            Inventory::Slots(slots) => slots
                .iter()
                .find(|s| s.id == entry_id)
                .map(|s| format!("{} - {}", s.start_time, s.end_time)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Inventory::Shifts(shifts) => shifts.len(),
            Inventory::Slots(slots) => slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==============================================================================
// DATES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min && date <= self.max
    }
}

/// Offered when the picked date is the doctor's weekly off-day.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OffDayOffer {
    pub requested: NaiveDate,
    pub suggested: NaiveDate,
    pub off_day: String,
    pub suggested_within_bounds: bool,
}

// ==============================================================================
// WORKFLOW
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    LoadingDoctor,
    Ready,
    SelectingShift,
    Submitting,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub token_number: Option<String>,
    pub booking_id: Option<String>,
    pub doctor_name: String,
    pub booking_date: NaiveDate,
    pub selection_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingWorkflow {
    pub workflow_id: String,
    pub doctor: Doctor,
    pub mode: DoctorBookingMode,
    pub state: WorkflowState,
    pub bounds: DateBounds,
    pub date: Option<NaiveDate>,
    pub inventory: Option<Inventory>,
    pub selected_id: Option<String>,
    pub off_day_offer: Option<OffDayOffer>,
    pub last_error: Option<String>,
    pub confirmation: Option<BookingConfirmation>,
    pub created_at: DateTime<Utc>,
}

impl BookingWorkflow {
    /// Apply a shift/slot click. Booked slots and unknown ids leave the
    /// current selection untouched.
    pub fn select(&mut self, entry_id: &str) -> SelectionOutcome {
        let outcome = match &self.inventory {
            Some(inventory) => inventory.classify(entry_id),
            None => SelectionOutcome::Unknown,
        };

        if outcome == SelectionOutcome::Selected {
            self.selected_id = Some(entry_id.to_string());
        }

        outcome
    }

    pub fn selection_label(&self) -> Option<String> {
        let selected = self.selected_id.as_deref()?;
        self.inventory.as_ref()?.label(selected)
    }
}

// ==============================================================================
// PATIENT FORMS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingFor {
    #[default]
    Myself,
    SomeoneElse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientForm {
    #[serde(default)]
    pub booking_for: BookingFor,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnBehalfForm {
    pub date: NaiveDate,
    #[serde(alias = "shift_id", alias = "slot_id")]
    pub selection_id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub patient_gender: Option<String>,
    pub patient_age: Option<u32>,
}

/// Patient fields as the booking endpoints receive them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatientDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookedBy {
    #[serde(rename = "self")]
    Patient,
    Doctor,
}

impl BookedBy {
    pub fn as_tag(&self) -> &'static str {
        match self {
            BookedBy::Patient => "self",
            BookedBy::Doctor => "doctor",
        }
    }
}

// ==============================================================================
// SUBMISSION SAGA
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    Registering,
    Booking,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub saga: Vec<SagaStep>,
    pub confirmation: Option<BookingConfirmation>,
    pub notice: Notice,
    pub redirect: Option<String>,
    /// Set when the submission registered a new user and opened a session.
    pub session_id: Option<String>,
    /// Registration went through but the booking did not.
    pub orphaned_registration: bool,
}

#[derive(Debug, Deserialize)]
pub struct StartWorkflowRequest {
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChooseDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct OffDayDecision {
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectEntryRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    pub date: Option<NaiveDate>,
}
