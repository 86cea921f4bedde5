use predicates::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{API_KEY, TestEnv, mount_repo, mount_settings, repo_json};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn info_shows_prompt_details() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    mount_settings(&server, Some("alice")).await;
    mount_repo(&server, "alice", "greeter").await;

    env.hub_cmd(&server)
        .args(["info", "alice/greeter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:        alice/greeter"))
        .stdout(predicate::str::contains("Description: Greets people"))
        .stdout(predicate::str::contains("Tags:        demo, greeting"))
        .stdout(predicate::str::contains("Commits:     2"))
        .stdout(predicate::str::contains("Latest:      c0ffee00aabbccdd"))
        .stdout(predicate::str::contains("Created:     2024-05-01 12:00:00 UTC"))
        .stdout(predicate::str::contains(
            "URL:         http://localhost:3000/prompts/greeter?organizationId=org-123",
        ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn info_links_other_tenants_to_the_public_hub() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    mount_settings(&server, Some("alice")).await;
    mount_repo(&server, "bob", "summarizer").await;

    env.hub_cmd(&server)
        .args(["info", "bob/summarizer:0123456789abcdef"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "URL:         http://localhost:3000/hub/bob/summarizer:01234567",
        ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn info_missing_prompt_fails() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/nothing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    env.hub_cmd(&server)
        .args(["info", "alice/nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt not found: alice/nothing"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn info_reports_auth_failures() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/greeter"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
        .mount(&server)
        .await;

    env.hub_cmd(&server)
        .args(["info", "alice/greeter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to get prompt: 401"))
        .stderr(predicate::str::contains("Invalid token"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn info_reads_legacy_endpoint_and_key_variables() {
    let env = TestEnv::new();
    let server = MockServer::start().await;
    mount_settings(&server, Some("alice")).await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/greeter"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("alice", "greeter")))
        .expect(1)
        .mount(&server)
        .await;

    env.cmd()
        .env("LANGCHAIN_ENDPOINT", server.uri())
        .env("LANGCHAIN_API_KEY", API_KEY)
        .args(["info", "alice/greeter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:        alice/greeter"));
}
