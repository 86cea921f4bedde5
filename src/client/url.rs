use reqwest::Url;

const LOCAL_WEB_URL: &str = "http://localhost:3000";
const DEV_WEB_URL: &str = "https://dev.smith.langchain.com";
const EU_WEB_URL: &str = "https://eu.smith.langchain.com";
const DEFAULT_WEB_URL: &str = "https://smith.langchain.com";

/// Guess the hub's web host from its API URL.
pub fn derive_host_url(api_url: &str) -> String {
    if is_localhost(api_url) {
        return LOCAL_WEB_URL.to_string();
    }
    if let Some(stripped) = api_url.strip_suffix("/api/v1") {
        return stripped.to_string();
    }

    // Everything before the first '.', scheme included.
    let first_label = api_url.split('.').next().unwrap_or_default();
    if api_url.contains("/api") && !first_label.ends_with("api") {
        return api_url.replacen("/api", "", 1);
    }
    if first_label.contains("dev") {
        return DEV_WEB_URL.to_string();
    }
    if first_label.contains("eu") {
        return EU_WEB_URL.to_string();
    }
    DEFAULT_WEB_URL.to_string()
}

fn is_localhost(api_url: &str) -> bool {
    Url::parse(api_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .is_some_and(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]"))
}
