use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use shared_backend::{endpoints, BackendClient, BackendError, Envelope};
use shared_models::loose::LooseNumber;

/// One row of a doctor's coin ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinUsageEntry {
    #[serde(default, alias = "createdAt", alias = "created_at")]
    pub date: Option<String>,
    #[serde(default, alias = "actionType", alias = "type")]
    pub action_type: Option<String>,
    #[serde(default, alias = "patientName")]
    pub patient_name: Option<String>,
    #[serde(default, alias = "coinsUsed", alias = "coins")]
    pub coins_used: LooseNumber,
}

fn balance_from(envelope: &Envelope) -> i64 {
    ["balance", "coinBalance", "coin_balance", "coins"]
        .iter()
        .find_map(|name| envelope.field(name))
        .or(envelope.data.as_ref().filter(|d| d.is_number() || d.is_string()))
        .map(|v| LooseNumber(v.clone()).as_i64())
        .unwrap_or(0)
}

pub struct WalletService {
    backend: BackendClient,
}

impl WalletService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn balance(&self, doctor_id: &str, auth_token: Option<&str>) -> Result<i64, BackendError> {
        let envelope = self
            .backend
            .get(endpoints::COIN_BALANCE, &[("doctorId", doctor_id)], auth_token)
            .await?;
        let balance = balance_from(&envelope);
        debug!("Coin balance for {}: {}", doctor_id, balance);
        Ok(balance)
    }

    pub async fn usage_history(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<CoinUsageEntry>, BackendError> {
        let envelope = self
            .backend
            .get(endpoints::COIN_USAGE_HISTORY, &[("doctorId", doctor_id)], auth_token)
            .await?;

        match envelope.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => envelope.data_as(),
        }
    }
}
