use async_trait::async_trait;
use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::OvhError;
use crate::poller::{FetchError, StatusSource};
use crate::task::{OperationHandle, TaskStatus};

pub const OVH_EU_API_BASE: &str = "https://eu.api.ovh.com/1.0";

/// Thin JSON client over the OVH REST API, authenticated with an OAuth2
/// access token.
#[derive(Clone)]
pub struct OvhClient {
    client: reqwest::Client,
    base_url: String,
}

impl OvhClient {
    pub fn new(token: String) -> Result<Self, OvhError> {
        Self::with_base_url(token, OVH_EU_API_BASE.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Result<Self, OvhError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let header_value = HeaderValue::from_str(&auth_value).map_err(|_| OvhError::Auth {
            message: "Invalid token format".to_string(),
        })?;
        headers.insert(AUTHORIZATION, header_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(OvhError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, OvhError> {
        self.send(self.client.get(self.url(path)), "GET", path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, OvhError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.post(self.url(path)).json(body), "POST", path)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, OvhError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.put(self.url(path)).json(body), "PUT", path)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, OvhError> {
        self.send(self.client.delete(self.url(path)), "DELETE", path)
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<T, OvhError> {
        tracing::debug!(method, path, "OVH API request");

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OvhError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }

        // Some calls answer with an empty body.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| OvhError::Decode {
            message: format!("Failed to parse {} {} response: {}", method, path, e),
        })
    }
}

/// OVH error bodies look like `{"class": "...", "message": "..."}`.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[async_trait]
impl StatusSource for OvhClient {
    async fn fetch_status(&self, handle: &OperationHandle) -> Result<TaskStatus, FetchError> {
        let kind = handle.kind.ok_or_else(|| FetchError::Decode {
            message: format!("operation {} has no task kind", handle),
        })?;

        let body: serde_json::Value = self.get(&kind.path(handle)).await?;
        kind.parse_status(&body)
    }
}

impl std::fmt::Debug for OvhClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OvhClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
