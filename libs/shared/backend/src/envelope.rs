use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BackendError;

/// The `{status, message, data}` wrapper every backend endpoint answers with.
/// Some endpoints put their payload next to `data` instead of inside it;
/// those fields land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Fail with the backend's own message when it reports `status: false`.
    pub fn into_success(self) -> Result<Self, BackendError> {
        if self.status {
            Ok(self)
        } else {
            Err(BackendError::Rejected(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Request could not be completed".to_string()),
            ))
        }
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        let data = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Look a field up inside `data` first, then at the top level.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|d| d.get(name))
            .filter(|v| !v.is_null())
            .or_else(|| self.extra.get(name).filter(|v| !v.is_null()))
    }

    pub fn field_string(&self, name: &str) -> Option<String> {
        self.field(name).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First of several spellings the backend uses for the same field.
    pub fn first_string(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.field_string(name))
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}
