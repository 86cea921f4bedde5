use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use prompthub::{ClientConfig, HubClient};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "lsv2-test-key-0001";
pub const ORG_ID: &str = "org-123";

pub struct TestEnv {
    pub config_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().expect("failed to create config_dir"),
            work_dir: TempDir::new().expect("failed to create work_dir"),
        }
    }

    /// Build a prompthub Command pre-configured with --config-dir and cwd = work_dir.
    /// Endpoint and key variables from the outer environment are cleared.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("prompthub"));
        cmd.arg("--config-dir")
            .arg(self.config_dir.path())
            .current_dir(self.work_dir.path())
            .env_remove("LANGSMITH_ENDPOINT")
            .env_remove("LANGSMITH_API_KEY")
            .env_remove("LANGCHAIN_ENDPOINT")
            .env_remove("LANGCHAIN_API_KEY")
            .env_remove("PROMPTHUB_CONFIG_DIR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Command pointed at a mock hub.
    pub fn hub_cmd(&self, server: &MockServer) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--api-url")
            .arg(server.uri())
            .args(["--api-key", API_KEY]);
        cmd
    }

    /// Write a manifest into work_dir and return its path.
    pub fn write_manifest(&self, name: &str, manifest: &Value) -> PathBuf {
        let file = self.work_dir.path().join(name);
        fs::write(&file, serde_json::to_string_pretty(manifest).unwrap()).unwrap();
        file
    }
}

pub fn client(server: &MockServer) -> HubClient {
    let config = ClientConfig {
        api_url: Some(server.uri()),
        api_key: Some(API_KEY.to_string()),
        ..Default::default()
    };
    HubClient::new(&config).unwrap()
}

/// `GET /settings` for a tenant with the given hub handle.
pub async fn mount_settings(server: &MockServer, handle: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ORG_ID,
            "display_name": "Test Org",
            "tenant_handle": handle,
        })))
        .mount(server)
        .await;
}

pub fn repo_json(owner: &str, repo: &str) -> Value {
    json!({
        "repo": {
            "id": "5f1c2a1e-0000-4000-8000-000000000001",
            "owner": owner,
            "repo_handle": repo,
            "full_name": format!("{owner}/{repo}"),
            "description": "Greets people",
            "tags": ["demo", "greeting"],
            "is_public": false,
            "num_likes": 3,
            "num_downloads": 42,
            "num_commits": 2,
            "last_commit_hash": "c0ffee00aabbccdd",
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-02T08:30:00Z",
        }
    })
}

pub async fn mount_repo(server: &MockServer, owner: &str, repo: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(owner, repo)))
        .mount(server)
        .await;
}

/// The repo is missing on the first lookup and present afterwards.
pub async fn mount_repo_created_on_push(server: &MockServer, owner: &str, repo: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .up_to_n_times(1)
        .mount(server)
        .await;
    mount_repo(server, owner, repo).await;
    Mock::given(method("POST"))
        .and(path("/repos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(owner, repo)))
        .expect(1)
        .mount(server)
        .await;
}

/// Commit history whose head is `latest`, plus the commit endpoint answering
/// with `new_hash`.
pub async fn mount_commit_endpoints(server: &MockServer, owner: &str, repo: &str, latest: &str, new_hash: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/commits/{owner}/{repo}/")))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commits": [{"commit_hash": latest, "parent_commit_hash": null}],
            "total": 1,
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/commits/{owner}/{repo}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": {"commit_hash": new_hash, "manifest": {}},
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// `GET /commits/{owner}/{repo}/{commit}` returning `manifest` as `hash`.
pub async fn mount_pull(server: &MockServer, owner: &str, repo: &str, commit: &str, hash: &str, manifest: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/commits/{owner}/{repo}/{commit}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit_hash": hash,
            "manifest": manifest,
            "examples": [],
        })))
        .mount(server)
        .await;
}

/// Body of the last request the server received for `method path`.
pub async fn last_body(server: &MockServer, http_method: &str, request_path: &str) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests
        .iter()
        .rev()
        .find(|r| r.method.as_str() == http_method && r.url.path() == request_path)
        .unwrap_or_else(|| panic!("no {http_method} {request_path} request received"));
    serde_json::from_slice(&request.body).unwrap()
}

fn prompt_template(template: &str, format: &str, input_variables: &[&str]) -> Value {
    json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "prompts", "prompt", "PromptTemplate"],
        "kwargs": {
            "input_variables": input_variables,
            "template": template,
            "template_format": format,
        }
    })
}

fn message(class: &str, template: &str, format: &str, input_variables: &[&str]) -> Value {
    json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "prompts", "chat", class],
        "kwargs": {"prompt": prompt_template(template, format, input_variables)}
    })
}

/// Two-message f-string chat prompt with a `question` variable.
pub fn chat_manifest() -> Value {
    json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "prompts", "chat", "ChatPromptTemplate"],
        "kwargs": {
            "input_variables": ["question"],
            "messages": [
                message("SystemMessagePromptTemplate", "You answer briefly.", "f-string", &[]),
                message("HumanMessagePromptTemplate", "{question}", "f-string", &["question"]),
            ],
            "template_format": "f-string",
        }
    })
}

/// Mustache chat prompt declaring a dotted `user.name` variable.
pub fn mustache_manifest() -> Value {
    json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "prompts", "chat", "ChatPromptTemplate"],
        "kwargs": {
            "input_variables": ["user.name", "topic"],
            "messages": [
                message(
                    "HumanMessagePromptTemplate",
                    "Hi {{user.name}}, tell me about {{topic}}.",
                    "mustache",
                    &["user.name", "topic"],
                ),
            ],
            "template_format": "mustache",
        }
    })
}

/// Chat prompt piped into an Anthropic model, as stored with `include_model`.
pub fn anthropic_sequence_manifest() -> Value {
    json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "schema", "runnable", "RunnableSequence"],
        "kwargs": {
            "first": chat_manifest(),
            "middle": [],
            "last": {
                "lc": 1,
                "type": "constructor",
                "id": ["langchain", "chat_models", "anthropic", "ChatAnthropic"],
                "kwargs": {
                    "model": "claude-3-5-sonnet-latest",
                    "temperature": 0.2,
                    "anthropic_api_key": {"lc": 1, "type": "secret", "id": ["ANTHROPIC_API_KEY"]},
                }
            }
        }
    })
}
