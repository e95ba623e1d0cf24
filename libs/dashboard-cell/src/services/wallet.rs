use chrono::{FixedOffset, Utc};

use payment_cell::services::wallet::WalletService;
use shared_backend::BackendClient;
use shared_models::error::AppError;
use shared_models::session::SessionContext;
use shared_utils::date_display::{display, parse_backend_timestamp};

use crate::models::{WalletEntry, WalletView};

pub struct DashboardWalletService {
    wallet: WalletService,
}

impl DashboardWalletService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self {
            wallet: WalletService::with_client(backend),
        }
    }

    /// Balance and usage history, fetched together. History dates are shown
    /// in the viewer's offset.
    pub async fn view(&self, session: &SessionContext, offset: FixedOffset) -> Result<WalletView, AppError> {
        let token = Some(session.auth_token.as_str());
        let (balance, history) = futures::join!(
            self.wallet.balance(&session.user_id, token),
            self.wallet.usage_history(&session.user_id, token)
        );

        let now = Utc::now();
        let history = history?
            .into_iter()
            .map(|entry| {
                let displayed = entry
                    .date
                    .as_deref()
                    .and_then(parse_backend_timestamp)
                    .map(|ts| display(ts, offset, now));
                WalletEntry { entry, displayed }
            })
            .collect();

        Ok(WalletView {
            balance: balance?,
            history,
        })
    }
}
