use tracing::debug;

use shared_backend::{endpoints, BackendClient, BackendError};
use shared_config::AppConfig;

use crate::models::{District, IndianState};

pub struct LocationLookupService {
    backend: BackendClient,
}

impl LocationLookupService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Enabled states only.
    pub async fn list_states(&self) -> Result<Vec<IndianState>, BackendError> {
        debug!("Fetching enabled states");
        let envelope = self.backend.get(endpoints::STATES_LIST, &[], None).await?;
        envelope.data_as()
    }

    pub async fn list_districts(&self, state_id: &str) -> Result<Vec<District>, BackendError> {
        debug!("Fetching enabled districts for state {}", state_id);
        let envelope = self
            .backend
            .get(endpoints::DISTRICTS_LIST, &[("stateId", state_id)], None)
            .await?;
        envelope.data_as()
    }
}
