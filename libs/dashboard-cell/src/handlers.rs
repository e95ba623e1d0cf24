use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;
use shared_utils::date_display::viewer_offset;
use shared_utils::extractor::require_doctor;
use shared_utils::request_tracker::RequestTracker;

use crate::models::{
    BookingsQuery, DashboardView, PhotoUploaded, ReminderRequest, ReminderSent, StatusChangeRequest,
    ViewerQuery, WalletView,
};
use crate::services::bookings::{DashboardService, DashboardStore, StatusChange, STATUS_UPDATE_FAILED};
use crate::services::photo::{PhotoFile, PhotoService, PHOTO_FIELD};
use crate::services::reminders::ReminderService;
use crate::services::wallet::DashboardWalletService;

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub views: DashboardStore,
    pub tracker: RequestTracker,
}

impl DashboardState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
            views: DashboardStore::new(),
            tracker: RequestTracker::new(),
        }
    }

    fn bookings(&self) -> DashboardService {
        DashboardService::new(
            self.backend.clone(),
            self.views.clone(),
            self.tracker.clone(),
            self.config.completed_status_id.clone(),
        )
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl IntoResponse for StatusChange {
    fn into_response(self) -> Response {
        match self {
            StatusChange::Applied(update) => Json(update).into_response(),
            StatusChange::Failed(notice) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": STATUS_UPDATE_FAILED,
                    "notice": notice
                })),
            )
                .into_response(),
        }
    }
}

#[axum::debug_handler]
pub async fn get_bookings(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<DashboardView>, AppError> {
    require_doctor(&session)?;

    let date = query.date.unwrap_or_else(today);
    let view = state.bookings().load(&session, date).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn poll_bookings(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<DashboardView>, AppError> {
    require_doctor(&session)?;

    let view = state.bookings().poll(&session, today()).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    Path(token_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<StatusChange, AppError> {
    require_doctor(&session)?;

    state
        .bookings()
        .update_status(&session, &token_id, &request.status_id)
        .await
}

#[axum::debug_handler]
pub async fn get_wallet(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<WalletView>, AppError> {
    require_doctor(&session)?;

    let offset = viewer_offset(query.tz_offset_minutes);
    let wallet = DashboardWalletService::with_client(state.backend.clone())
        .view(&session, offset)
        .await?;
    Ok(Json(wallet))
}

#[axum::debug_handler]
pub async fn send_reminder(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<ReminderRequest>,
) -> Result<Json<ReminderSent>, AppError> {
    require_doctor(&session)?;

    let sent = ReminderService::with_client(state.backend.clone())
        .send(&session, request, today())
        .await?;
    Ok(Json(sent))
}

#[axum::debug_handler]
pub async fn list_reminders(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<Value>, AppError> {
    require_doctor(&session)?;

    let reminders = ReminderService::with_client(state.backend.clone())
        .history(&session, viewer_offset(query.tz_offset_minutes))
        .await?;
    Ok(Json(json!({
        "reminders": reminders,
        "total": reminders.len()
    })))
}

#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<DashboardState>,
    Extension(session): Extension<SessionContext>,
    mut multipart: Multipart,
) -> Result<Json<PhotoUploaded>, AppError> {
    require_doctor(&session)?;

    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
        photo = Some(PhotoFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let photo = photo.ok_or_else(|| AppError::BadRequest("Choose a photo to upload".to_string()))?;
    let uploaded = PhotoService::with_client(state.backend.clone())
        .upload(&session, photo)
        .await?;
    Ok(Json(uploaded))
}
