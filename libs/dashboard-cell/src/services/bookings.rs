use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use shared_backend::{endpoints, BackendClient, BackendError, Envelope};
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::SessionContext;
use shared_utils::request_tracker::RequestTracker;

use crate::models::{BookingRow, DashboardView, StatusUpdate, TokenStatus};

pub const STATUS_UPDATE_FAILED: &str = "Could not update the token status. Please try again.";

/// Views not reloaded for this long are dropped on the next store.
pub const DASHBOARD_VIEW_TTL_MINUTES: i64 = 60;

/// Latest dashboard view per doctor.
#[derive(Clone, Default)]
pub struct DashboardStore {
    views: Arc<RwLock<HashMap<String, DashboardView>>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, doctor_id: &str) -> Option<DashboardView> {
        self.views.read().await.get(doctor_id).cloned()
    }

    /// Store `view`, sweeping views nobody has reloaded. Returns the
    /// doctor ids swept.
    async fn put(&self, view: DashboardView) -> Vec<String> {
        let cutoff = Utc::now() - Duration::minutes(DASHBOARD_VIEW_TTL_MINUTES);
        let mut views = self.views.write().await;
        let expired: Vec<String> = views
            .values()
            .filter(|v| v.loaded_at < cutoff)
            .map(|v| v.doctor_id.clone())
            .collect();
        for doctor_id in &expired {
            views.remove(doctor_id);
        }
        views.insert(view.doctor_id.clone(), view);
        expired
    }

    async fn update<F, T>(&self, doctor_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut DashboardView) -> T,
    {
        let mut views = self.views.write().await;
        views.get_mut(doctor_id).map(f)
    }
}

#[derive(Debug)]
pub enum StatusChange {
    Applied(StatusUpdate),
    /// The backend refused or could not be reached. The row is unchanged.
    Failed(Notice),
}

pub(crate) fn list_or_empty<T: DeserializeOwned>(envelope: Envelope) -> Result<Vec<T>, BackendError> {
    match envelope.data {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => envelope.data_as(),
    }
}

pub struct DashboardService {
    backend: BackendClient,
    store: DashboardStore,
    tracker: RequestTracker,
    completed_status_id: String,
}

impl DashboardService {
    pub fn new(
        backend: BackendClient,
        store: DashboardStore,
        tracker: RequestTracker,
        completed_status_id: String,
    ) -> Self {
        Self {
            backend,
            store,
            tracker,
            completed_status_id,
        }
    }

    async fn fetch_bookings(&self, session: &SessionContext, date: NaiveDate) -> Result<Vec<BookingRow>, BackendError> {
        let date = date.format("%Y-%m-%d").to_string();
        let envelope = self
            .backend
            .get(
                endpoints::TOKENS_BY_DOCTOR_AND_DATE,
                &[("doctorId", session.user_id.as_str()), ("date", date.as_str())],
                Some(&session.auth_token),
            )
            .await?;
        list_or_empty(envelope)
    }

    async fn fetch_statuses(&self, session: &SessionContext) -> Result<Vec<TokenStatus>, BackendError> {
        let envelope = self
            .backend
            .get(endpoints::TOKEN_STATUS_LIST, &[], Some(&session.auth_token))
            .await?;
        list_or_empty(envelope)
    }

    /// Load the bookings for `date` and replace the doctor's view. A load
    /// overtaken by a newer one returns whatever the newer one stored.
    pub async fn load(&self, session: &SessionContext, date: NaiveDate) -> Result<DashboardView, AppError> {
        let doctor_id = session.user_id.as_str();
        let ticket = self.tracker.issue(doctor_id).await;

        let (bookings, statuses) =
            futures::join!(self.fetch_bookings(session, date), self.fetch_statuses(session));

        if !self.tracker.is_current(&ticket).await {
            return self
                .store
                .get(doctor_id)
                .await
                .ok_or_else(|| AppError::Conflict("A newer dashboard load is in progress".to_string()));
        }

        let view = DashboardView::build(doctor_id, date, bookings?, statuses?, &self.completed_status_id);
        debug!(
            "Dashboard for {} on {}: {} tokens, {} completed",
            doctor_id, date, view.total_tokens, view.completed_tokens
        );
        for expired in self.store.put(view.clone()).await {
            debug!("Dropped idle dashboard view for {}", expired);
            self.tracker.forget(&expired).await;
        }
        Ok(view)
    }

    /// Re-fetch whatever date the doctor is looking at.
    pub async fn poll(&self, session: &SessionContext, today: NaiveDate) -> Result<DashboardView, AppError> {
        let date = self
            .store
            .get(&session.user_id)
            .await
            .map(|view| view.date)
            .unwrap_or(today);
        self.load(session, date).await
    }

    pub async fn update_status(
        &self,
        session: &SessionContext,
        token_id: &str,
        status_id: &str,
    ) -> Result<StatusChange, AppError> {
        let doctor_id = session.user_id.as_str();
        let view = self
            .store
            .get(doctor_id)
            .await
            .ok_or_else(|| AppError::Conflict("Load your bookings before changing a status".to_string()))?;

        if !view.has_row(token_id) {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        let status = view
            .status(status_id)
            .cloned()
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status {}", status_id)))?;

        let result = self
            .backend
            .post(
                endpoints::UPDATE_TOKEN_STATUS,
                json!({"tokenId": token_id, "statusId": status.id}),
                Some(&session.auth_token),
            )
            .await;

        if let Err(e) = result {
            error!("Status update for token {} to {} failed: {}", token_id, status.name, e);
            let message = e.rejected_message().unwrap_or(STATUS_UPDATE_FAILED).to_string();
            return Ok(StatusChange::Failed(Notice::error("Status not updated", message)));
        }

        let completed_status_id = self.completed_status_id.as_str();
        let updated = self
            .store
            .update(doctor_id, |v| {
                v.apply_status(token_id, &status, completed_status_id);
                v.clone()
            })
            .await
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        info!("Token {} moved to {} by doctor {}", token_id, status.name, doctor_id);

        Ok(StatusChange::Applied(StatusUpdate {
            view: updated,
            notice: Notice::success("Status updated", format!("Token marked as {}", status.name)),
        }))
    }
}
