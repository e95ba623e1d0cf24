use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use payment_cell::services::wallet::CoinUsageEntry;
use shared_models::loose::{id_string, opt_id_string};
use shared_models::notice::Notice;
use shared_utils::date_display::DisplayedDate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenStatus {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "status_name", alias = "statusName", alias = "status")]
    pub name: String,
}

/// A booked token as `getTokenDetailsByDocIdAndDate` lists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRow {
    #[serde(alias = "tokenId", alias = "token_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "tokenNumber", alias = "token_no", deserialize_with = "opt_id_string")]
    pub token_number: Option<String>,
    #[serde(default, alias = "patientName")]
    pub patient_name: Option<String>,
    #[serde(default, alias = "patientPhone")]
    pub patient_phone: Option<String>,
    #[serde(
        default,
        alias = "statusId",
        alias = "token_status_id",
        deserialize_with = "opt_id_string"
    )]
    pub status_id: Option<String>,
    #[serde(default, alias = "statusName")]
    pub status_name: Option<String>,
    #[serde(default, alias = "shiftName")]
    pub shift_name: Option<String>,
    #[serde(default, alias = "bookingDate")]
    pub booking_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardRow {
    #[serde(flatten)]
    pub booking: BookingRow,
    /// Every status the row can move to from where it is now.
    pub transitions: Vec<TokenStatus>,
}

impl DashboardRow {
    fn is_status(&self, status_id: &str) -> bool {
        self.booking.status_id.as_deref() == Some(status_id)
    }
}

fn transitions_for(current: Option<&str>, statuses: &[TokenStatus]) -> Vec<TokenStatus> {
    statuses
        .iter()
        .filter(|s| Some(s.id.as_str()) != current)
        .cloned()
        .collect()
}

/// One doctor's bookings for one date, plus the status vocabulary.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub rows: Vec<DashboardRow>,
    pub statuses: Vec<TokenStatus>,
    pub total_tokens: usize,
    pub completed_tokens: usize,
    pub loaded_at: DateTime<Utc>,
}

impl DashboardView {
    pub fn build(
        doctor_id: &str,
        date: NaiveDate,
        bookings: Vec<BookingRow>,
        statuses: Vec<TokenStatus>,
        completed_status_id: &str,
    ) -> Self {
        let rows: Vec<DashboardRow> = bookings
            .into_iter()
            .map(|mut booking| {
                if booking.status_name.is_none() {
                    booking.status_name = booking
                        .status_id
                        .as_deref()
                        .and_then(|id| statuses.iter().find(|s| s.id == id))
                        .map(|s| s.name.clone());
                }
                let transitions = transitions_for(booking.status_id.as_deref(), &statuses);
                DashboardRow { booking, transitions }
            })
            .collect();

        let completed_tokens = rows.iter().filter(|r| r.is_status(completed_status_id)).count();

        Self {
            doctor_id: doctor_id.to_string(),
            date,
            total_tokens: rows.len(),
            completed_tokens,
            rows,
            statuses,
            loaded_at: Utc::now(),
        }
    }

    pub fn status(&self, status_id: &str) -> Option<&TokenStatus> {
        self.statuses.iter().find(|s| s.id == status_id)
    }

    pub fn has_row(&self, token_id: &str) -> bool {
        self.rows.iter().any(|r| r.booking.id == token_id)
    }

    /// Apply a confirmed status change locally. Returns false for an unknown row.
    pub fn apply_status(&mut self, token_id: &str, status: &TokenStatus, completed_status_id: &str) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.booking.id == token_id) else {
            return false;
        };

        let was_completed = row.is_status(completed_status_id);
        let now_completed = status.id == completed_status_id;

        row.booking.status_id = Some(status.id.clone());
        row.booking.status_name = Some(status.name.clone());
        row.transitions = transitions_for(Some(&status.id), &self.statuses);

        if now_completed && !was_completed {
            self.completed_tokens += 1;
        } else if was_completed && !now_completed {
            self.completed_tokens = self.completed_tokens.saturating_sub(1);
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub view: DashboardView,
    pub notice: Notice,
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(deserialize_with = "id_string")]
    pub status_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletEntry {
    #[serde(flatten)]
    pub entry: CoinUsageEntry,
    pub displayed: Option<DisplayedDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub balance: i64,
    pub history: Vec<WalletEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub follow_up_date: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default, alias = "patientName")]
    pub patient_name: Option<String>,
    #[serde(default, alias = "patientPhone")]
    pub patient_phone: Option<String>,
    #[serde(default, alias = "followUpDate")]
    pub follow_up_date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderEntry {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub displayed: Option<DisplayedDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderSent {
    pub notice: Notice,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoUploaded {
    pub photo_url: Option<String>,
    pub notice: Notice,
}
