use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_backend::BackendClient;
use shared_models::error::AppError;
use shared_utils::request_tracker::RequestTracker;

use crate::models::LocationCascade;
use crate::services::lookup::LocationLookupService;

pub const STATES_FAILED_MESSAGE: &str = "Unable to load states. Please refresh the page to try again.";
pub const DISTRICTS_FAILED_MESSAGE: &str =
    "Unable to load districts. Please refresh the page to try again.";

/// Pickers older than this are dropped when a new one is mounted.
pub const CASCADE_TTL_MINUTES: i64 = 60;

#[derive(Clone, Default)]
pub struct CascadeRegistry {
    cascades: Arc<RwLock<HashMap<String, LocationCascade>>>,
}

impl CascadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, cascade_id: &str) -> Option<LocationCascade> {
        self.cascades.read().await.get(cascade_id).cloned()
    }

    /// Store `cascade`, sweeping expired ones. Returns the ids swept.
    async fn put(&self, cascade: LocationCascade) -> Vec<String> {
        let cutoff = Utc::now() - Duration::minutes(CASCADE_TTL_MINUTES);
        let mut cascades = self.cascades.write().await;
        let expired: Vec<String> = cascades
            .values()
            .filter(|c| c.created_at < cutoff)
            .map(|c| c.cascade_id.clone())
            .collect();
        for cascade_id in &expired {
            cascades.remove(cascade_id);
        }
        cascades.insert(cascade.cascade_id.clone(), cascade);
        expired
    }

    async fn update<F>(&self, cascade_id: &str, f: F) -> Result<LocationCascade, AppError>
    where
        F: FnOnce(&mut LocationCascade),
    {
        let mut cascades = self.cascades.write().await;
        let cascade = cascades
            .get_mut(cascade_id)
            .ok_or_else(|| AppError::NotFound("Location picker not found".to_string()))?;
        f(cascade);
        Ok(cascade.clone())
    }
}

pub struct LocationCascadeService {
    lookup: LocationLookupService,
    registry: CascadeRegistry,
    tracker: RequestTracker,
    default_state_id: Option<String>,
}

impl LocationCascadeService {
    pub fn new(
        backend: BackendClient,
        registry: CascadeRegistry,
        tracker: RequestTracker,
        default_state_id: Option<String>,
    ) -> Self {
        Self {
            lookup: LocationLookupService::with_client(backend),
            registry,
            tracker,
            default_state_id,
        }
    }

    async fn store(&self, cascade: LocationCascade) {
        let expired = self.registry.put(cascade).await;
        if !expired.is_empty() {
            debug!("Dropped {} expired location pickers", expired.len());
        }
        for cascade_id in &expired {
            self.tracker.forget(cascade_id).await;
        }
    }

    /// Fetch states, pick the default and resolve its districts.
    pub async fn mount(&self) -> Result<LocationCascade, AppError> {
        let mut cascade = LocationCascade::new(Uuid::new_v4().to_string());

        match self.lookup.list_states().await {
            Ok(states) => cascade.states = states,
            Err(e) => {
                warn!("State list fetch failed for cascade {}: {}", cascade.cascade_id, e);
                cascade.fail(STATES_FAILED_MESSAGE);
                self.store(cascade.clone()).await;
                return Ok(cascade);
            }
        }

        let default_state = cascade.default_state_id(self.default_state_id.as_deref());
        let cascade_id = cascade.cascade_id.clone();
        self.store(cascade.clone()).await;

        info!("Location cascade {} mounted", cascade_id);

        match default_state {
            Some(state_id) => self.select_state(&cascade_id, &state_id).await,
            None => Ok(cascade),
        }
    }

    fn ensure_usable(cascade: &LocationCascade) -> Result<(), AppError> {
        match &cascade.error {
            Some(message) => Err(AppError::Conflict(message.clone())),
            None => Ok(()),
        }
    }

    pub async fn select_state(
        &self,
        cascade_id: &str,
        state_id: &str,
    ) -> Result<LocationCascade, AppError> {
        let cascade = self
            .registry
            .get(cascade_id)
            .await
            .ok_or_else(|| AppError::NotFound("Location picker not found".to_string()))?;
        Self::ensure_usable(&cascade)?;

        if !cascade.has_state(state_id) {
            return Err(AppError::BadRequest(format!("State {} is not available", state_id)));
        }

        let ticket = self.tracker.issue(cascade_id).await;
        let fetched = self.lookup.list_districts(state_id).await;

        if !self.tracker.is_current(&ticket).await {
            // A newer state change owns the cascade now.
            return self
                .registry
                .get(cascade_id)
                .await
                .ok_or_else(|| AppError::NotFound("Location picker not found".to_string()));
        }

        let updated = match fetched {
            Ok(districts) => {
                self.registry
                    .update(cascade_id, |c| {
                        let resolved = c.apply_districts(state_id, districts);
                        info!(
                            "Cascade {} resolved state {} to district {:?}",
                            c.cascade_id, state_id, resolved
                        );
                    })
                    .await?
            }
            Err(e) => {
                warn!("District fetch failed for cascade {}: {}", cascade_id, e);
                self.registry
                    .update(cascade_id, |c| c.fail(DISTRICTS_FAILED_MESSAGE))
                    .await?
            }
        };

        Ok(updated)
    }

    pub async fn select_district(
        &self,
        cascade_id: &str,
        district_id: &str,
    ) -> Result<LocationCascade, AppError> {
        let mut selected = false;
        let cascade = self
            .registry
            .update(cascade_id, |c| {
                if !c.is_failed() {
                    selected = c.select_district(district_id);
                }
            })
            .await?;

        Self::ensure_usable(&cascade)?;

        if !selected {
            return Err(AppError::BadRequest(format!(
                "District {} is not available",
                district_id
            )));
        }

        Ok(cascade)
    }

    pub async fn get(&self, cascade_id: &str) -> Result<LocationCascade, AppError> {
        self.registry
            .get(cascade_id)
            .await
            .ok_or_else(|| AppError::NotFound("Location picker not found".to_string()))
    }
}
