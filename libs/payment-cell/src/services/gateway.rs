use serde_json::json;
use tracing::{debug, info, warn};

use shared_backend::{BackendClient, BackendError, Method};

use crate::models::{GatewayOrder, GatewayResponse, PaymentIntent};

pub const ORDER_ID_PREFIX: &str = "order_";

/// Client for the order-creation proxy in front of the payment gateway.
pub struct OrderGateway {
    backend: BackendClient,
    order_url: String,
    currency: String,
}

impl OrderGateway {
    pub fn new(backend: BackendClient, order_url: &str, currency: &str) -> Self {
        Self {
            backend,
            order_url: order_url.to_string(),
            currency: currency.to_string(),
        }
    }

    pub async fn create_order(
        &self,
        intent: &PaymentIntent,
        receipt: &str,
    ) -> Result<GatewayOrder, BackendError> {
        let body = json!({
            "amount": intent.amount_minor,
            "currency": self.currency,
            "receipt": receipt,
            "notes": {
                "doctorId": intent.owner_id,
                "coins": intent.quantity,
                "purpose": intent.purpose,
            }
        });

        debug!("Creating payment order for {} ({} minor units)", intent.owner_id, intent.amount_minor);

        let response: GatewayResponse = self
            .backend
            .request_url(Method::POST, &self.order_url, None, &[], Some(body))
            .await?;

        if !response.success {
            return Err(BackendError::Rejected(
                response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Unable to create payment order".to_string()),
            ));
        }

        let order = response
            .data
            .filter(|order| !order.id.trim().is_empty())
            .ok_or_else(|| BackendError::Decode("payment order has no id".to_string()))?;

        if !order.id.starts_with(ORDER_ID_PREFIX) {
            warn!("Payment order id {} lacks the {} prefix", order.id, ORDER_ID_PREFIX);
        }

        info!(
            "Payment order {} created for {} (status {:?})",
            order.id, intent.owner_id, order.status
        );

        Ok(order)
    }
}
