use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_models::error::AppError;

use crate::models::{PaymentSaga, PaymentState};

/// An order left open longer than this no longer blocks its owner.
pub const CHECKOUT_TIMEOUT_MINUTES: i64 = 30;

/// Settled sagas are kept this long for lookups. Sagas awaiting
/// reconciliation are kept until someone resolves them.
pub const SETTLED_SAGA_TTL_HOURS: i64 = 24;

#[derive(Default)]
struct LedgerInner {
    sagas: HashMap<String, PaymentSaga>,
    /// owner id -> saga id of the purchase in flight
    busy: HashMap<String, String>,
}

impl LedgerInner {
    fn sweep_settled(&mut self) {
        let cutoff = Utc::now() - Duration::hours(SETTLED_SAGA_TTL_HOURS);
        let before = self.sagas.len();
        self.sagas.retain(|_, saga| {
            !(saga.state.is_terminal()
                && saga.state != PaymentState::NeedsReconciliation
                && saga.updated_at < cutoff)
        });
        if self.sagas.len() < before {
            debug!("Dropped {} settled payment sagas", before - self.sagas.len());
        }
    }
}

#[derive(Clone, Default)]
pub struct PaymentLedger {
    inner: Arc<RwLock<LedgerInner>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the owner's busy flag for a new saga. Fails while another
    /// purchase is in flight.
    pub async fn begin(&self, saga: PaymentSaga) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let owner = saga.intent.owner_id.clone();

        if let Some(active_id) = inner.busy.get(&owner).cloned() {
            let stale_cutoff = Utc::now() - Duration::minutes(CHECKOUT_TIMEOUT_MINUTES);
            match inner.sagas.get_mut(&active_id) {
                Some(active)
                    if active.state == PaymentState::OrderCreated && active.updated_at < stale_cutoff =>
                {
                    info!("Abandoned checkout {} for {} cancelled", active_id, owner);
                    active.failure_reason = Some("Checkout abandoned".to_string());
                    active.move_to(PaymentState::Cancelled);
                }
                Some(_) => {
                    return Err(AppError::Conflict(
                        "A payment is already in progress. Please complete or close it first."
                            .to_string(),
                    ))
                }
                None => {}
            }
        }

        inner.sweep_settled();
        inner.busy.insert(owner, saga.saga_id.clone());
        inner.sagas.insert(saga.saga_id.clone(), saga);
        Ok(())
    }

    pub async fn get(&self, saga_id: &str, owner_id: &str) -> Result<PaymentSaga, AppError> {
        self.inner
            .read()
            .await
            .sagas
            .get(saga_id)
            .filter(|s| s.intent.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    /// Apply `f` to a saga that is still in `expected`; anything else is a
    /// 409. Reaching a terminal state releases the owner's busy flag.
    pub async fn transition<F>(
        &self,
        saga_id: &str,
        owner_id: &str,
        expected: PaymentState,
        f: F,
    ) -> Result<PaymentSaga, AppError>
    where
        F: FnOnce(&mut PaymentSaga),
    {
        let mut inner = self.inner.write().await;
        let saga = inner
            .sagas
            .get_mut(saga_id)
            .filter(|s| s.intent.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if saga.state != expected {
            return Err(AppError::Conflict(if saga.state.is_terminal() {
                "This payment has already been completed".to_string()
            } else {
                "This payment is already being processed".to_string()
            }));
        }

        f(saga);
        let updated = saga.clone();

        if updated.state.is_terminal() {
            inner.busy.remove(owner_id);
        }

        Ok(updated)
    }

    pub async fn is_busy(&self, owner_id: &str) -> bool {
        self.inner.read().await.busy.contains_key(owner_id)
    }

    pub async fn needing_reconciliation(&self, owner_id: &str) -> Vec<PaymentSaga> {
        let inner = self.inner.read().await;
        let mut sagas: Vec<PaymentSaga> = inner
            .sagas
            .values()
            .filter(|s| s.intent.owner_id == owner_id && s.state == PaymentState::NeedsReconciliation)
            .cloned()
            .collect();
        sagas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sagas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::models::PaymentIntent;

    fn saga(id: &str, owner: &str) -> PaymentSaga {
        PaymentSaga::new(id.to_string(), PaymentIntent::coin_purchase(owner, 10))
    }

    #[tokio::test]
    async fn owner_is_busy_until_terminal_state() {
        let ledger = PaymentLedger::new();
        ledger.begin(saga("s1", "D1")).await.unwrap();
        assert!(ledger.is_busy("D1").await);

        let second = ledger.begin(saga("s2", "D1")).await;
        assert_matches!(second, Err(AppError::Conflict(_)));

        ledger
            .transition("s1", "D1", PaymentState::OrderCreated, |s| s.move_to(PaymentState::Captured))
            .await
            .unwrap();
        assert!(ledger.is_busy("D1").await);

        ledger
            .transition("s1", "D1", PaymentState::Captured, |s| s.move_to(PaymentState::Credited))
            .await
            .unwrap();
        assert!(!ledger.is_busy("D1").await);
        assert!(ledger.begin(saga("s3", "D1")).await.is_ok());
    }

    #[tokio::test]
    async fn terminal_sagas_reject_outcomes() {
        let ledger = PaymentLedger::new();
        ledger.begin(saga("s1", "D1")).await.unwrap();
        ledger
            .transition("s1", "D1", PaymentState::OrderCreated, |s| s.move_to(PaymentState::Failed))
            .await
            .unwrap();

        let again = ledger
            .transition("s1", "D1", PaymentState::OrderCreated, |s| s.move_to(PaymentState::Cancelled))
            .await;
        assert_matches!(again, Err(AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn sagas_are_scoped_to_their_owner() {
        let ledger = PaymentLedger::new();
        ledger.begin(saga("s1", "D1")).await.unwrap();
        assert_matches!(ledger.get("s1", "D2").await, Err(AppError::NotFound(_)));
        assert!(!ledger.is_busy("D2").await);
    }

    #[tokio::test]
    async fn stale_checkout_does_not_block() {
        let ledger = PaymentLedger::new();
        let mut old = saga("s1", "D1");
        old.updated_at = Utc::now() - Duration::minutes(CHECKOUT_TIMEOUT_MINUTES + 1);
        ledger.begin(old).await.unwrap();

        assert!(ledger.begin(saga("s2", "D1")).await.is_ok());
        assert_eq!(ledger.get("s1", "D1").await.unwrap().state, PaymentState::Cancelled);
    }

    #[tokio::test]
    async fn settled_sagas_are_swept_but_reconciliation_is_kept() {
        let ledger = PaymentLedger::new();
        let aged = Utc::now() - Duration::hours(SETTLED_SAGA_TTL_HOURS + 1);
        for (id, state) in [
            ("credited", PaymentState::Credited),
            ("stuck", PaymentState::NeedsReconciliation),
        ] {
            ledger.begin(saga(id, "D1")).await.unwrap();
            ledger
                .transition(id, "D1", PaymentState::OrderCreated, |s| s.move_to(state))
                .await
                .unwrap();
            ledger.inner.write().await.sagas.get_mut(id).unwrap().updated_at = aged;
        }

        ledger.begin(saga("s3", "D1")).await.unwrap();

        assert_matches!(ledger.get("credited", "D1").await, Err(AppError::NotFound(_)));
        assert_eq!(ledger.get("stuck", "D1").await.unwrap().state, PaymentState::NeedsReconciliation);
        assert_eq!(ledger.needing_reconciliation("D1").await.len(), 1);
    }
}

