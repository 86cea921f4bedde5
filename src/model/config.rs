use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.smith.langchain.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            web_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Configuration taken from the `LANGSMITH_*` (or legacy `LANGCHAIN_*`)
    /// environment variables.
    pub fn from_env() -> Self {
        Self {
            api_url: env_var(&["LANGSMITH_ENDPOINT", "LANGCHAIN_ENDPOINT"]),
            api_key: env_var(&["LANGSMITH_API_KEY", "LANGCHAIN_API_KEY"]),
            web_url: None,
            timeout_secs: default_timeout(),
        }
    }

    /// Replace the endpoint and key when an override is given.
    pub fn with_overrides(mut self, api_url: Option<String>, api_key: Option<String>) -> Self {
        if api_url.is_some() {
            self.api_url = api_url;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

fn env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
