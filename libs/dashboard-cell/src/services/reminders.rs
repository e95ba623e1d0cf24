use chrono::{FixedOffset, NaiveDate, Utc};
use serde_json::json;
use tracing::info;

use shared_backend::{endpoints, BackendClient};
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::SessionContext;
use shared_utils::date_display::{display, parse_backend_timestamp};
use shared_utils::validation::FieldValidator;

use crate::models::{Reminder, ReminderEntry, ReminderRequest, ReminderSent};
use crate::services::bookings::list_or_empty;

pub struct ReminderService {
    backend: BackendClient,
}

impl ReminderService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn validate(request: &ReminderRequest, today: NaiveDate) -> Result<NaiveDate, AppError> {
        let date = NaiveDate::parse_from_str(request.follow_up_date.trim(), "%Y-%m-%d").ok();

        FieldValidator::new()
            .required("patient_name", &request.patient_name, "Patient name")
            .phone("patient_phone", request.patient_phone.trim())
            .check(date.is_some(), "follow_up_date", "Please choose a follow-up date")
            .check(
                date.map_or(true, |d| d >= today),
                "follow_up_date",
                "Follow-up date cannot be in the past",
            )
            .finish()?;

        date.ok_or_else(|| AppError::BadRequest("Please choose a follow-up date".to_string()))
    }

    pub async fn send(
        &self,
        session: &SessionContext,
        request: ReminderRequest,
        today: NaiveDate,
    ) -> Result<ReminderSent, AppError> {
        let follow_up = Self::validate(&request, today)?;

        let envelope = self
            .backend
            .post(
                endpoints::SEND_FOLLOW_UP_REMINDER,
                json!({
                    "doctorId": session.user_id,
                    "patientName": request.patient_name.trim(),
                    "patientPhone": request.patient_phone.trim(),
                    "followUpDate": follow_up.format("%Y-%m-%d").to_string(),
                    "message": request.message.unwrap_or_default()
                }),
                Some(&session.auth_token),
            )
            .await?;

        info!("Follow-up reminder for {} sent by doctor {}", follow_up, session.user_id);

        Ok(ReminderSent {
            notice: Notice::success("Reminder sent", envelope.message_or("The patient will be reminded.")),
        })
    }

    pub async fn history(
        &self,
        session: &SessionContext,
        offset: FixedOffset,
    ) -> Result<Vec<ReminderEntry>, AppError> {
        let envelope = self
            .backend
            .get(
                endpoints::GET_FOLLOW_UP_REMINDERS,
                &[("doctorId", session.user_id.as_str())],
                Some(&session.auth_token),
            )
            .await?;
        let reminders: Vec<Reminder> = list_or_empty(envelope)?;

        let now = Utc::now();
        Ok(reminders
            .into_iter()
            .map(|reminder| {
                let displayed = reminder
                    .created_at
                    .as_deref()
                    .and_then(parse_backend_timestamp)
                    .map(|ts| display(ts, offset, now));
                ReminderEntry { reminder, displayed }
            })
            .collect())
    }
}
