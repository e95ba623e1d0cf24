use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorCard, DoctorSearchQuery};
use crate::services::{directory::DoctorDirectoryService, filter};

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let district_id = query
        .district_id
        .clone()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Please select a district".to_string()))?;

    let directory = DoctorDirectoryService::new(&state);
    let doctors = directory.doctors_by_district(&district_id).await?;

    let filters = query.filters();
    let narrowed = filter::apply(&doctors, &filters);
    debug!(
        "District {}: {} doctors, {} after filters",
        district_id,
        doctors.len(),
        narrowed.len()
    );

    let cards: Vec<DoctorCard> = narrowed.into_iter().map(DoctorCard::from).collect();

    Ok(Json(json!({
        "district_id": district_id,
        "doctors": cards,
        "total": cards.len(),
        "unfiltered_total": doctors.len(),
        "filters": filters
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorCard>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctor = directory.doctor_by_id(&doctor_id, None).await?;

    Ok(Json(DoctorCard::from(doctor)))
}

#[axum::debug_handler]
pub async fn list_specializations(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);
    let specializations = directory.specializations().await?;

    Ok(Json(json!({
        "specializations": specializations,
        "total": specializations.len()
    })))
}

#[axum::debug_handler]
pub async fn list_hospitals(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);
    let hospitals = directory.hospitals().await?;

    Ok(Json(json!({
        "hospitals": hospitals,
        "total": hospitals.len()
    })))
}
