use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use shared_backend::{endpoints, BackendClient};
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::SessionContext;

use crate::models::{
    CheckoutDescriptor, PaymentIntent, PaymentOutcome, PaymentSaga, PaymentState,
    PaymentSuccessRequest,
};
use crate::services::gateway::OrderGateway;
use crate::services::ledger::PaymentLedger;
use crate::services::signature;
use crate::services::wallet::WalletService;

pub const CHECKOUT_NAME: &str = "OPD Connect";
pub const MAX_COINS_PER_ORDER: u32 = 100_000;
const SUCCESS_DISMISS_MS: u64 = 4000;

pub struct PaymentFlowService {
    config: Arc<AppConfig>,
    backend: BackendClient,
    ledger: PaymentLedger,
}

fn auth(session: &SessionContext) -> Option<&str> {
    Some(session.auth_token.as_str()).filter(|t| !t.is_empty())
}

impl PaymentFlowService {
    pub fn new(config: Arc<AppConfig>, backend: BackendClient, ledger: PaymentLedger) -> Self {
        Self {
            config,
            backend,
            ledger,
        }
    }

    pub async fn create_coin_order(
        &self,
        session: &SessionContext,
        coins: u32,
    ) -> Result<CheckoutDescriptor, AppError> {
        if coins == 0 || coins > MAX_COINS_PER_ORDER {
            return Err(AppError::BadRequest(format!(
                "Please choose between 1 and {} coins",
                MAX_COINS_PER_ORDER
            )));
        }
        if !self.config.is_payment_configured() {
            return Err(AppError::Internal("payment gateway is not configured".to_string()));
        }

        let intent = PaymentIntent::coin_purchase(&session.user_id, coins);
        let saga_id = Uuid::new_v4().to_string();
        self.ledger
            .begin(PaymentSaga::new(saga_id.clone(), intent.clone()))
            .await?;

        let gateway = OrderGateway::new(
            self.backend.clone(),
            &self.config.payment_order_url,
            &self.config.payment_currency,
        );
        let receipt = format!("coins_{}", &saga_id[..8]);

        let order = match gateway.create_order(&intent, &receipt).await {
            Ok(order) => order,
            Err(e) => {
                warn!("Order creation failed for saga {}: {}", saga_id, e);
                let reason = e.to_string();
                self.ledger
                    .transition(&saga_id, &session.user_id, PaymentState::OrderCreated, |s| {
                        s.failure_reason = Some(reason);
                        s.move_to(PaymentState::Failed);
                    })
                    .await?;
                return Err(e.into());
            }
        };

        let order_id = order.id.clone();
        let saga = self
            .ledger
            .transition(&saga_id, &session.user_id, PaymentState::OrderCreated, |s| {
                s.order_id = Some(order_id);
            })
            .await?;

        info!("Saga {} awaiting checkout for order {}", saga.saga_id, order.id);

        Ok(CheckoutDescriptor {
            saga_id,
            key_id: self.config.payment_key_id.clone(),
            order_id: order.id,
            amount: order.amount,
            currency: order
                .currency
                .unwrap_or_else(|| self.config.payment_currency.clone()),
            name: CHECKOUT_NAME.to_string(),
            description: format!("Purchase of {} coins", coins),
        })
    }

    fn signature_matches(&self, saga: &PaymentSaga, request: &PaymentSuccessRequest) -> bool {
        if saga.order_id.as_deref() != Some(request.order_id.as_str()) {
            return false;
        }
        if self.config.payment_key_secret.is_empty() {
            return true;
        }
        request.signature.as_deref().is_some_and(|sig| {
            signature::verify(
                &request.order_id,
                &request.payment_id,
                sig,
                &self.config.payment_key_secret,
            )
        })
    }

    pub async fn record_success(
        &self,
        session: &SessionContext,
        saga_id: &str,
        request: PaymentSuccessRequest,
    ) -> Result<PaymentOutcome, AppError> {
        let owner = session.user_id.as_str();
        let snapshot = self.ledger.get(saga_id, owner).await?;

        if !self.signature_matches(&snapshot, &request) {
            warn!("Checkout signature mismatch for saga {}", saga_id);
            let saga = self
                .ledger
                .transition(saga_id, owner, PaymentState::OrderCreated, |s| {
                    s.payment_id = Some(request.payment_id.clone());
                    s.failure_reason = Some("Payment verification failed".to_string());
                    s.move_to(PaymentState::Failed);
                })
                .await?;
            return Ok(PaymentOutcome {
                saga,
                notice: Notice::error(
                    "Payment failed",
                    format!(
                        "We could not verify this payment. If money was deducted, please contact support at {}.",
                        self.config.support_contact
                    ),
                ),
                wallet_balance: None,
            });
        }

        let saga = self
            .ledger
            .transition(saga_id, owner, PaymentState::OrderCreated, |s| {
                s.payment_id = Some(request.payment_id.clone());
                s.move_to(PaymentState::Captured);
            })
            .await?;

        let body = json!({
            "doctorId": owner,
            "coins": saga.intent.quantity,
            "paymentId": request.payment_id,
            "orderId": request.order_id,
        });

        match self
            .backend
            .post(endpoints::PURCHASE_SUBSCRIPTION, body, auth(session))
            .await
        {
            Ok(_) => {
                let saga = self
                    .ledger
                    .transition(saga_id, owner, PaymentState::Captured, |s| {
                        s.move_to(PaymentState::Credited)
                    })
                    .await?;
                info!("Saga {} credited {} coins to {}", saga_id, saga.intent.quantity, owner);

                let wallet = WalletService::with_client(self.backend.clone());
                let wallet_balance = match wallet.balance(owner, auth(session)).await {
                    Ok(balance) => Some(balance),
                    Err(e) => {
                        warn!("Wallet refresh after credit failed for {}: {}", owner, e);
                        None
                    }
                };

                Ok(PaymentOutcome {
                    notice: Notice::success(
                        "Payment successful",
                        format!("{} coins have been added to your wallet", saga.intent.quantity),
                    )
                    .auto_dismiss(SUCCESS_DISMISS_MS),
                    saga,
                    wallet_balance,
                })
            }
            Err(e) => {
                error!(
                    "Payment {} captured but crediting failed for saga {}: {}",
                    request.payment_id, saga_id, e
                );
                let reason = e.to_string();
                let saga = self
                    .ledger
                    .transition(saga_id, owner, PaymentState::Captured, |s| {
                        s.failure_reason = Some(reason);
                        s.move_to(PaymentState::NeedsReconciliation);
                    })
                    .await?;

                Ok(PaymentOutcome {
                    notice: Notice::warning(
                        "Payment received",
                        format!(
                            "Your payment {} was captured but the coins were not credited. Please contact support at {}.",
                            request.payment_id, self.config.support_contact
                        ),
                    ),
                    saga,
                    wallet_balance: None,
                })
            }
        }
    }

    pub async fn record_failure(
        &self,
        session: &SessionContext,
        saga_id: &str,
        reason: Option<String>,
    ) -> Result<PaymentOutcome, AppError> {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Payment was not completed".to_string());

        let recorded = reason.clone();
        let saga = self
            .ledger
            .transition(saga_id, &session.user_id, PaymentState::OrderCreated, |s| {
                s.failure_reason = Some(recorded);
                s.move_to(PaymentState::Failed);
            })
            .await?;

        info!("Saga {} failed: {}", saga_id, reason);

        Ok(PaymentOutcome {
            saga,
            notice: Notice::error("Payment failed", reason),
            wallet_balance: None,
        })
    }

    pub async fn dismiss(&self, session: &SessionContext, saga_id: &str) -> Result<PaymentOutcome, AppError> {
        let saga = self
            .ledger
            .transition(saga_id, &session.user_id, PaymentState::OrderCreated, |s| {
                s.move_to(PaymentState::Cancelled)
            })
            .await?;

        info!("Saga {} cancelled by {}", saga_id, session.user_id);

        Ok(PaymentOutcome {
            saga,
            notice: Notice::info("Payment cancelled", "No coins were purchased."),
            wallet_balance: None,
        })
    }
}
