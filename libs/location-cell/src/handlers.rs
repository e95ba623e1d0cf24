use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::request_tracker::RequestTracker;

use crate::models::{LocationCascade, SelectDistrictRequest, SelectStateRequest};
use crate::services::cascade::{CascadeRegistry, LocationCascadeService};
use crate::services::lookup::LocationLookupService;

#[derive(Clone)]
pub struct LocationState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub cascades: CascadeRegistry,
    pub tracker: RequestTracker,
}

impl LocationState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            backend: BackendClient::new(&config),
            config,
            cascades: CascadeRegistry::new(),
            tracker: RequestTracker::new(),
        }
    }

    fn cascade_service(&self) -> LocationCascadeService {
        LocationCascadeService::new(
            self.backend.clone(),
            self.cascades.clone(),
            self.tracker.clone(),
            self.config.default_state_id.clone(),
        )
    }
}

#[axum::debug_handler]
pub async fn list_states(State(state): State<LocationState>) -> Result<Json<Value>, AppError> {
    let lookup = LocationLookupService::with_client(state.backend.clone());
    let states = lookup.list_states().await?;

    Ok(Json(json!({
        "states": states,
        "total": states.len()
    })))
}

#[axum::debug_handler]
pub async fn list_districts(
    State(state): State<LocationState>,
    Path(state_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let lookup = LocationLookupService::with_client(state.backend.clone());
    let districts = lookup.list_districts(&state_id).await?;

    Ok(Json(json!({
        "state_id": state_id,
        "districts": districts,
        "total": districts.len()
    })))
}

#[axum::debug_handler]
pub async fn mount_cascade(
    State(state): State<LocationState>,
) -> Result<Json<LocationCascade>, AppError> {
    let cascade = state.cascade_service().mount().await?;
    Ok(Json(cascade))
}

#[axum::debug_handler]
pub async fn get_cascade(
    State(state): State<LocationState>,
    Path(cascade_id): Path<String>,
) -> Result<Json<LocationCascade>, AppError> {
    let cascade = state.cascade_service().get(&cascade_id).await?;
    Ok(Json(cascade))
}

#[axum::debug_handler]
pub async fn select_state(
    State(state): State<LocationState>,
    Path(cascade_id): Path<String>,
    Json(request): Json<SelectStateRequest>,
) -> Result<Json<LocationCascade>, AppError> {
    let cascade = state
        .cascade_service()
        .select_state(&cascade_id, &request.state_id)
        .await?;
    Ok(Json(cascade))
}

#[axum::debug_handler]
pub async fn select_district(
    State(state): State<LocationState>,
    Path(cascade_id): Path<String>,
    Json(request): Json<SelectDistrictRequest>,
) -> Result<Json<LocationCascade>, AppError> {
    let cascade = state
        .cascade_service()
        .select_district(&cascade_id, &request.district_id)
        .await?;
    Ok(Json(cascade))
}
