//! HTTP client for the prompt hub API.
//!
//! Only the endpoints needed to create, update, commit and fetch prompts are
//! covered. Storage, versioning and access control are the service's job; the
//! client just maps responses onto [`HubError`].

mod prompts;
mod url;

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::error::HubError;
use crate::model::{ClientConfig, Settings};

pub use url::derive_host_url;

pub struct HubClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    web_url: Option<String>,
    settings: OnceCell<Settings>,
}

impl HubClient {
    pub fn new(config: &ClientConfig) -> Result<Self, HubError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            web_url: config.web_url.clone(),
            settings: OnceCell::new(),
        })
    }

    /// Client configured from the environment, with optional overrides.
    pub fn from_env(api_url: Option<String>, api_key: Option<String>) -> Result<Self, HubError> {
        Self::new(&ClientConfig::from_env().with_overrides(api_url, api_key))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Web host the hub UI is served from.
    pub fn host_url(&self) -> String {
        match &self.web_url {
            Some(web) => web.trim_end_matches('/').to_string(),
            None => derive_host_url(&self.api_url),
        }
    }

    /// Settings of the tenant the API key belongs to. Fetched once per client.
    pub async fn settings(&self) -> Result<&Settings, HubError> {
        self.settings
            .get_or_try_init(|| async {
                let response = self.send(self.request(Method::GET, "/settings"), "get settings").await?;
                read_json(response, "get settings").await
            })
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.api_url, path));
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        req
    }

    async fn send(&self, req: RequestBuilder, context: &str) -> Result<Response, HubError> {
        let response = req.send().await?;
        raise_for_status(response, context).await
    }
}

async fn raise_for_status(response: Response, context: &str) -> Result<Response, HubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%status, context, "hub request failed");
    if status == StatusCode::CONFLICT {
        return Err(HubError::Conflict {
            context: context.to_string(),
            body,
        });
    }
    Err(HubError::Api {
        context: context.to_string(),
        status,
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, HubError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| HubError::InvalidResponse {
        context: context.to_string(),
        reason: e.to_string(),
    })
}
