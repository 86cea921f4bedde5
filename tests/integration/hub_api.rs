use std::sync::Arc;

use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompthub::hub::{self, ModelClass, NamedModelClass, PullOptions, PushOptions};
use prompthub::load::{Kwargs, LoadError};
use prompthub::model::PromptMetadata;
use prompthub::runnable::{
    ChatModel, ChatPromptTemplate, MessageRole, RunnableRef, RunnableSequence, TemplateFormat,
};
use prompthub::{HubError, PromptIdentifier};

use crate::common::{
    anthropic_sequence_manifest, chat_manifest, client, last_body, mount_commit_endpoints, mount_pull,
    mount_repo, mount_repo_created_on_push, mount_settings, mustache_manifest,
};

fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[tokio::test]
async fn push_with_builds_manifest_from_runnable() {
    let server = MockServer::start().await;
    mount_settings(&server, Some("alice")).await;
    mount_repo_created_on_push(&server, "-", "greeter").await;
    mount_commit_endpoints(&server, "-", "greeter", "0a1b2c3d4e5f", "deadbeefcafe1234").await;

    let prompt = ChatPromptTemplate::from_messages(
        [(MessageRole::System, "You answer briefly."), (MessageRole::Human, "{question}")],
        TemplateFormat::FString,
    )
    .unwrap();
    let options = PushOptions {
        new_repo_description: Some("Greets people".to_string()),
        ..Default::default()
    };

    let url = hub::push_with(&client(&server), "greeter", &prompt, &options)
        .await
        .unwrap();
    assert_eq!(url, "http://localhost:3000/prompts/greeter/deadbeef?organizationId=org-123");

    let created = last_body(&server, "POST", "/repos/").await;
    assert_eq!(created["description"], "Greets people");
    let commit = last_body(&server, "POST", "/commits/-/greeter").await;
    assert_eq!(commit["manifest"], chat_manifest());
}

#[tokio::test]
async fn update_without_options_is_rejected() {
    let server = MockServer::start().await;
    let id = PromptIdentifier::parse("greeter").unwrap();

    let err = client(&server)
        .update_prompt(&id, &PromptMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::NothingToUpdate));
}

#[tokio::test]
async fn commit_to_missing_prompt_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/-/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let id = PromptIdentifier::parse("ghost").unwrap();
    let err = client(&server)
        .create_commit(&id, &chat_manifest(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::PromptNotFound { ref identifier } if identifier == "-/ghost"));
}

#[tokio::test]
async fn conflicting_create_maps_to_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Repo already exists"))
        .mount(&server)
        .await;

    let id = PromptIdentifier::parse("greeter").unwrap();
    let err = client(&server)
        .create_prompt(&id, &PromptMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Conflict { ref body, .. } if body == "Repo already exists"));
}

#[tokio::test]
async fn settings_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "org-123",
            "tenant_handle": "alice",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hub = client(&server);
    let latest = PromptIdentifier::parse("alice/greeter").unwrap();
    let pinned = PromptIdentifier::parse("alice/greeter:0123456789").unwrap();
    assert_eq!(
        hub.prompt_url(&latest).await.unwrap(),
        "http://localhost:3000/prompts/greeter?organizationId=org-123"
    );
    assert_eq!(
        hub.prompt_url(&pinned).await.unwrap(),
        "http://localhost:3000/prompts/greeter/01234567?organizationId=org-123"
    );
}

#[tokio::test]
async fn pull_with_loads_and_tags_the_prompt() {
    let server = MockServer::start().await;
    mount_pull(&server, "alice", "greeter", "latest", "c0ffee00aabbccdd", chat_manifest()).await;

    let obj = hub::pull_with(&client(&server), "alice/greeter", &PullOptions::default())
        .await
        .unwrap();
    assert_eq!(obj.metadata_str("lc_hub_owner"), Some("alice"));
    assert_eq!(obj.metadata_str("lc_hub_repo"), Some("greeter"));
    assert_eq!(obj.metadata_str("lc_hub_commit_hash"), Some("c0ffee00aabbccdd"));

    let chat = obj.downcast_ref::<ChatPromptTemplate>().unwrap();
    let messages = chat
        .format_messages(&values(&[("question", json!("Why is the sky blue?"))]))
        .unwrap();
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].content, "Why is the sky blue?");
}

#[tokio::test]
async fn pulled_mustache_prompt_renders_nested_values() {
    let server = MockServer::start().await;
    mount_pull(&server, "-", "tutor", "latest", "1111222233334444", mustache_manifest()).await;

    let obj = hub::pull_with(&client(&server), "tutor", &PullOptions::default())
        .await
        .unwrap();
    let chat = obj.downcast_ref::<ChatPromptTemplate>().unwrap();
    assert_eq!(chat.input_variables, vec!["user", "topic"]);

    let messages = chat
        .format_messages(&values(&[
            ("user", json!({"name": "Ada"})),
            ("topic", json!("engines")),
        ]))
        .unwrap();
    assert_eq!(messages[0].content, "Hi Ada, tell me about engines.");
}

#[tokio::test]
async fn pull_with_named_model_class() {
    let server = MockServer::start().await;
    mount_pull(&server, "alice", "assistant", "latest", "abcdef0123456789", anthropic_sequence_manifest()).await;

    let options = PullOptions {
        include_model: true,
        model_class: Some(Arc::new(NamedModelClass::new("ChatAnthropic").unwrap())),
        secrets: [("ANTHROPIC_API_KEY".to_string(), "sk-ant-test".to_string())].into(),
        ..Default::default()
    };
    let obj = hub::pull_with(&client(&server), "alice/assistant", &options)
        .await
        .unwrap();

    let sequence = obj.downcast_ref::<RunnableSequence>().unwrap();
    let model = sequence.find::<ChatModel>().unwrap();
    assert_eq!(model.class_name(), "ChatAnthropic");
    assert_eq!(model.model_name(), Some("claude-3-5-sonnet-latest"));
    assert_eq!(model.secret("anthropic_api_key"), Some("sk-ant-test"));
    assert_eq!(model.kwargs["temperature"], json!(0.2));
    assert_eq!(obj.metadata_str("lc_hub_repo"), Some("assistant"));
}

#[derive(Debug)]
struct GroqStub;

impl ModelClass for GroqStub {
    fn lc_name(&self) -> &str {
        "ChatGroq"
    }

    fn construct(&self, kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        let model = ChatModel::from_kwargs(
            vec!["langchain".into(), "chat_models".into(), "groq".into(), "ChatGroq".into()],
            kwargs,
        );
        Ok(Arc::new(model.with_kwarg("stubbed", true)))
    }
}

#[tokio::test]
async fn pull_with_custom_model_class() {
    let server = MockServer::start().await;
    let manifest = json!({
        "lc": 1,
        "type": "constructor",
        "id": ["langchain", "schema", "runnable", "RunnableSequence"],
        "kwargs": {
            "first": chat_manifest(),
            "last": {
                "lc": 1,
                "type": "constructor",
                "id": ["langchain", "chat_models", "groq", "ChatGroq"],
                "kwargs": {"model": "llama-3.1-8b-instant"},
            }
        }
    });
    mount_pull(&server, "alice", "fast", "latest", "9999888877776666", manifest).await;

    let options = PullOptions {
        include_model: true,
        model_class: Some(Arc::new(GroqStub)),
        ..Default::default()
    };
    let obj = hub::pull_with(&client(&server), "alice/fast", &options)
        .await
        .unwrap();
    let model = obj
        .downcast_ref::<RunnableSequence>()
        .and_then(|s| s.find::<ChatModel>())
        .unwrap();
    assert_eq!(model.kwargs["stubbed"], json!(true));
}

#[tokio::test]
async fn pull_model_without_class_is_explained() {
    let server = MockServer::start().await;
    mount_pull(&server, "alice", "assistant", "latest", "abcdef0123456789", anthropic_sequence_manifest()).await;

    let options = PullOptions {
        include_model: true,
        ..Default::default()
    };
    let err = hub::pull_with(&client(&server), "alice/assistant", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::ModelClassRequired { .. }));
    assert!(err.to_string().contains("non-OpenAI model"));

    // Without include_model the loader error surfaces unchanged.
    let err = hub::pull_with(&client(&server), "alice/assistant", &PullOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Load(LoadError::InvalidNamespace { .. })));
}

#[tokio::test]
async fn pull_rejects_unknown_model_class() {
    #[derive(Debug)]
    struct Cohere;

    impl ModelClass for Cohere {
        fn lc_name(&self) -> &str {
            "ChatCohere"
        }

        fn construct(&self, _kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
            unreachable!("never registered")
        }
    }

    let server = MockServer::start().await;
    mount_pull(&server, "alice", "greeter", "latest", "c0ffee00aabbccdd", chat_manifest()).await;

    let options = PullOptions {
        include_model: true,
        model_class: Some(Arc::new(Cohere)),
        ..Default::default()
    };
    let err = hub::pull_with(&client(&server), "alice/greeter", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::UnsupportedModelClass { ref name } if name == "ChatCohere"));
}

#[tokio::test]
async fn push_existing_prompt_uses_latest_parent() {
    let server = MockServer::start().await;
    mount_settings(&server, Some("alice")).await;
    mount_repo(&server, "-", "greeter").await;
    mount_commit_endpoints(&server, "-", "greeter", "0a1b2c3d4e5f", "deadbeefcafe1234").await;

    let prompt = ChatPromptTemplate::from_messages([(MessageRole::Human, "{question}")], TemplateFormat::FString)
        .unwrap();
    let options = PushOptions {
        parent_commit_hash: Some("latest".to_string()),
        ..Default::default()
    };
    hub::push_with(&client(&server), "greeter", &prompt, &options)
        .await
        .unwrap();

    let commit = last_body(&server, "POST", "/commits/-/greeter").await;
    assert_eq!(commit["parent_commit"], "0a1b2c3d4e5f");
}
