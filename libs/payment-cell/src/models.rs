use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::notice::Notice;

/// Minor currency units per coin. One coin costs one rupee.
pub const MINOR_UNITS_PER_COIN: u64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    CoinPurchase,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentIntent {
    pub amount_minor: u64,
    pub purpose: PaymentPurpose,
    pub owner_id: String,
    pub quantity: u32,
}

impl PaymentIntent {
    pub fn coin_purchase(owner_id: &str, coins: u32) -> Self {
        Self {
            amount_minor: u64::from(coins) * MINOR_UNITS_PER_COIN,
            purpose: PaymentPurpose::CoinPurchase,
            owner_id: owner_id.to_string(),
            quantity: coins,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    OrderCreated,
    Captured,
    Credited,
    /// Money was taken but the coins never landed. Needs a human.
    NeedsReconciliation,
    Failed,
    Cancelled,
}

impl PaymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentState::Credited
                | PaymentState::NeedsReconciliation
                | PaymentState::Failed
                | PaymentState::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSaga {
    pub saga_id: String,
    pub intent: PaymentIntent,
    pub state: PaymentState,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentSaga {
    pub fn new(saga_id: String, intent: PaymentIntent) -> Self {
        let now = Utc::now();
        Self {
            saga_id,
            intent,
            state: PaymentState::OrderCreated,
            order_id: None,
            payment_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn move_to(&mut self, state: PaymentState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

/// Order as the payment proxy returns it. Values are echoed to the
/// checkout widget untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<GatewayOrder>,
}

/// What the browser needs to open the hosted checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutDescriptor {
    pub saga_id: String,
    pub key_id: String,
    pub order_id: String,
    pub amount: Value,
    pub currency: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub saga: PaymentSaga,
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CoinOrderRequest {
    pub coins: u32,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessRequest {
    pub payment_id: String,
    pub order_id: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentFailureRequest {
    #[serde(default)]
    pub reason: Option<String>,
}
