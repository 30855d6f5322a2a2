//! reqwest-backed [`ItemApi`].
//!
//! Endpoints, relative to the configured base URL:
//! - `POST   projects/{key}/raid`
//! - `PATCH  projects/{key}/raid/{id}`
//! - `GET    projects/{key}/raid?type={type}`
//! - `POST   projects/{key}/workflow/transition`
//!
//! 2xx bodies are the `{success, data, error}` envelope. Other statuses are
//! read as `{error}` or `{message}` and reported as a failed response, so
//! only connection, timeout and decoding problems surface as [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use raidline_command::{ApiError, ApiResponse, ItemApi};
use raidline_core::config::ApiConfig;
use raidline_core::types::{ItemFields, ItemType, NewItem, RaidItem, WorkflowStatus};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransitionRequest<'a> {
    target_state: &'a str,
}

/// [`ItemApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpItemApi {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpItemApi {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "base url {} cannot carry a path",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = self.authorize(request).send().await.map_err(map_error)?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<ApiResponse<T>>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let text = response.text().await.map_err(map_error)?;
        let error = failure_message(status, &text);
        tracing::warn!(%status, %error, "Item API returned an error status");
        Ok(ApiResponse::failed(error))
    }
}

fn map_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Error text from a non-2xx body, falling back to the status line.
fn failure_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[async_trait]
impl ItemApi for HttpItemApi {
    async fn create(
        &self,
        project_key: &str,
        item: &NewItem,
    ) -> Result<ApiResponse<RaidItem>, ApiError> {
        let url = self.endpoint(&["projects", project_key, "raid"]);
        tracing::debug!(%url, item_type = %item.item_type, "Creating item");
        self.send(self.client.post(url).json(item)).await
    }

    async fn update(
        &self,
        project_key: &str,
        item_id: &str,
        updates: &ItemFields,
    ) -> Result<ApiResponse<RaidItem>, ApiError> {
        let url = self.endpoint(&["projects", project_key, "raid", item_id]);
        tracing::debug!(%url, fields = updates.len(), "Updating item");
        self.send(self.client.patch(url).json(updates)).await
    }

    async fn list(
        &self,
        project_key: &str,
        item_type: Option<ItemType>,
    ) -> Result<ApiResponse<Vec<RaidItem>>, ApiError> {
        let url = self.endpoint(&["projects", project_key, "raid"]);
        let mut request = self.client.get(url);
        if let Some(item_type) = item_type {
            request = request.query(&[("type", item_type.to_string())]);
        }
        self.send(request).await
    }

    async fn transition(
        &self,
        project_key: &str,
        target_state: &str,
    ) -> Result<ApiResponse<WorkflowStatus>, ApiError> {
        let url = self.endpoint(&["projects", project_key, "workflow", "transition"]);
        tracing::debug!(%url, target_state, "Requesting workflow transition");
        self.send(self.client.post(url).json(&TransitionRequest { target_state }))
            .await
    }
}
