use serde::{Deserialize, Serialize};

use shared_models::notice::Notice;

#[derive(Debug, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactReceipt {
    pub notice: Notice,
}
