use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Local, NaiveDate};
use serde_json::json;

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;
use shared_utils::extractor::{require_doctor, MaybeSession};
use shared_utils::request_tracker::RequestTracker;
use shared_utils::session::SessionStore;

use crate::models::{
    BookingWorkflow, ChooseDateRequest, InventoryQuery, OffDayDecision, OnBehalfForm, PatientForm,
    SelectEntryRequest, StartWorkflowRequest, SubmissionOutcome,
};
use crate::services::on_behalf::{OnBehalfBookingService, StaffInventory};
use crate::services::workflow::{BookingWorkflowService, SubmissionFailure, WorkflowRegistry};

#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub sessions: SessionStore,
    pub workflows: WorkflowRegistry,
    pub tracker: RequestTracker,
}

impl BookingState {
    pub fn new(config: Arc<AppConfig>, sessions: SessionStore) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
            sessions,
            workflows: WorkflowRegistry::new(),
            tracker: RequestTracker::new(),
        }
    }

    fn workflow_service(&self) -> BookingWorkflowService {
        BookingWorkflowService::new(
            self.backend.clone(),
            self.workflows.clone(),
            self.tracker.clone(),
            self.sessions.clone(),
            self.config.registration_placeholder_password.clone(),
        )
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl IntoResponse for SubmissionFailure {
    fn into_response(self) -> Response {
        let Some(outcome) = self.outcome else {
            return self.error.into_response();
        };

        let status = self.error.status_code();
        tracing::error!("Booking submission failed: {}: {}", status, self.error);

        (
            status,
            Json(json!({
                "error": self.error.user_message(),
                "saga": outcome.saga,
                "notice": outcome.notice,
                "session_id": outcome.session_id,
                "orphaned_registration": outcome.orphaned_registration
            })),
        )
            .into_response()
    }
}

#[axum::debug_handler]
pub async fn start_workflow(
    State(state): State<BookingState>,
    Json(request): Json<StartWorkflowRequest>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let workflow = state
        .workflow_service()
        .start(&request.doctor_id, today())
        .await?;
    Ok(Json(workflow))
}

#[axum::debug_handler]
pub async fn get_workflow(
    State(state): State<BookingState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let workflow = state.workflow_service().get(&workflow_id).await?;
    Ok(Json(workflow))
}

#[axum::debug_handler]
pub async fn choose_date(
    State(state): State<BookingState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<ChooseDateRequest>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let workflow = state
        .workflow_service()
        .choose_date(&workflow_id, request.date, today())
        .await?;
    Ok(Json(workflow))
}

#[axum::debug_handler]
pub async fn resolve_off_day(
    State(state): State<BookingState>,
    Path(workflow_id): Path<String>,
    Json(decision): Json<OffDayDecision>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let workflow = state
        .workflow_service()
        .resolve_off_day(&workflow_id, decision.accept, today())
        .await?;
    Ok(Json(workflow))
}

#[axum::debug_handler]
pub async fn select_entry(
    State(state): State<BookingState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<SelectEntryRequest>,
) -> Result<Json<BookingWorkflow>, AppError> {
    let workflow = state
        .workflow_service()
        .select(&workflow_id, &request.id)
        .await?;
    Ok(Json(workflow))
}

#[axum::debug_handler]
pub async fn submit_workflow(
    State(state): State<BookingState>,
    Extension(MaybeSession(session)): Extension<MaybeSession>,
    Path(workflow_id): Path<String>,
    Json(form): Json<PatientForm>,
) -> Result<Json<SubmissionOutcome>, SubmissionFailure> {
    let outcome = state
        .workflow_service()
        .submit(&workflow_id, form, session)
        .await?;
    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn on_behalf_inventory(
    State(state): State<BookingState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<StaffInventory>, AppError> {
    require_doctor(&session)?;

    let service = OnBehalfBookingService::with_client(state.backend.clone());
    let inventory = service.inventory(&session, query.date, today()).await?;
    Ok(Json(inventory))
}

#[axum::debug_handler]
pub async fn book_on_behalf(
    State(state): State<BookingState>,
    Extension(session): Extension<SessionContext>,
    Json(form): Json<OnBehalfForm>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    require_doctor(&session)?;

    let service = OnBehalfBookingService::with_client(state.backend.clone());
    let outcome = service.book(&session, form, today()).await?;
    Ok(Json(outcome))
}
