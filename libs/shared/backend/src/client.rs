use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::envelope::Envelope;
use crate::error::BackendError;

/// HTTP client for the booking backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build configured HTTP client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>, json: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Dropping auth token with invalid header characters"),
            }
        }

        headers
    }

    async fn send<T>(&self, req: RequestBuilder, url: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let response = req.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            BackendError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            // Business failures sometimes come back with a non-2xx code and
            // the usual envelope; prefer the envelope's message.
            if let Ok(envelope) = serde_json::from_str::<Envelope>(&error_text) {
                if !envelope.status {
                    if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
                        return Err(BackendError::Rejected(message));
                    }
                }
            }

            return Err(BackendError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Call an absolute URL. Used for the payment order proxy, which does not
    /// live under the backend base URL.
    pub async fn request_url<T>(
        &self,
        method: Method,
        url: &str,
        auth_token: Option<&str>,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, url)
            .headers(self.get_headers(auth_token, true));

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        self.send(req, url).await
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        self.request_url(method, &url, auth_token, query, body).await
    }

    /// GET an endpoint and unwrap its envelope, failing on `status: false`.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth_token: Option<&str>,
    ) -> Result<Envelope, BackendError> {
        let envelope: Envelope = self
            .request(Method::GET, path, auth_token, query, None)
            .await?;
        envelope.into_success()
    }

    /// POST JSON to an endpoint and unwrap its envelope.
    pub async fn post(
        &self,
        path: &str,
        body: Value,
        auth_token: Option<&str>,
    ) -> Result<Envelope, BackendError> {
        let envelope: Envelope = self
            .request(Method::POST, path, auth_token, &[], Some(body))
            .await?;
        envelope.into_success()
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        auth_token: Option<&str>,
    ) -> Result<Envelope, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making multipart request to {}", url);

        let req = self
            .client
            .post(&url)
            .headers(self.get_headers(auth_token, false))
            .multipart(form);

        let envelope: Envelope = self.send(req, &url).await?;
        envelope.into_success()
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            backend_base_url: url.to_string(),
            backend_timeout_secs: 5,
            payment_order_url: String::new(),
            payment_key_id: String::new(),
            payment_key_secret: String::new(),
            payment_currency: "INR".to_string(),
            default_state_id: None,
            completed_status_id: "5".to_string(),
            registration_placeholder_password: "placeholder".to_string(),
            support_contact: "support@example.com".to_string(),
            port: 3000,
        }
    }

    #[tokio::test]
    async fn get_forwards_query_and_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getDistrictsList"))
            .and(query_param("stateId", "7"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": [{"id": 1, "name": "Pune"}]
            })))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&config_for(&mock_server.uri()));
        let envelope = client
            .get("/getDistrictsList", &[("stateId", "7")], Some("abc"))
            .await
            .unwrap();
        assert!(envelope.status);
        assert_eq!(envelope.data.unwrap()[0]["name"], "Pune");
    }

    #[tokio::test]
    async fn error_status_with_envelope_is_rejected_with_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/registerUser"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": false,
                "message": "Phone already exists"
            })))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&config_for(&mock_server.uri()));
        let result = client.post("/registerUser", json!({}), None).await;
        assert_matches!(result, Err(BackendError::Rejected(msg)) if msg == "Phone already exists");
    }

    #[tokio::test]
    async fn plain_server_error_maps_to_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getStatesList"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&config_for(&mock_server.uri()));
        let result = client.get("/getStatesList", &[], None).await;
        assert_matches!(result, Err(BackendError::Status { status: 500, .. }));
    }
}
