use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{API_KEY, TestEnv};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn commits_lists_history() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/commits/alice/greeter/"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "1"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commits": [
                {"commit_hash": "c0ffee00aabbccdd", "parent_commit_hash": "0a1b2c3d4e5f", "created_at": "2024-05-02T08:30:00Z"},
                {"commit_hash": "0a1b2c3d4e5f", "parent_commit_hash": null},
            ],
            "total": 3,
        })))
        .expect(1)
        .mount(&server)
        .await;

    env.hub_cmd(&server)
        .args(["commits", "alice/greeter", "--limit", "2", "--offset", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commits for alice/greeter (3 total):"))
        .stdout(predicate::str::contains("  c0ffee00  2024-05-02 08:30:00 UTC"))
        .stdout(predicate::str::contains("  0a1b2c3d"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn commits_empty_history() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/commits/-/greeter/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"commits": [], "total": 0})))
        .mount(&server)
        .await;

    env.hub_cmd(&server)
        .args(["commits", "greeter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No commits for -/greeter"));
}

#[test]
fn commits_uses_configured_endpoint() {
    let env = TestEnv::new();

    env.cmd()
        .args(["config", "set", "api_url", "http://127.0.0.1:9"])
        .assert()
        .success();

    // Nothing listens on the discard port, so the request itself fails.
    env.cmd()
        .args(["commits", "alice/greeter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to list commits for 'alice/greeter'"))
        .stderr(predicate::str::contains("request to the hub failed"));
}
