use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tenant settings returned by `GET /settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tenant_handle: Option<String>,
}

/// A prompt repository as stored by the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    pub repo_handle: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub num_likes: u64,
    #[serde(default)]
    pub num_downloads: u64,
    #[serde(default)]
    pub num_commits: u64,
    #[serde(default)]
    pub last_commit_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    pub repo: Option<Repo>,
}

/// Repo-level metadata accepted when creating or updating a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptMetadata {
    pub description: Option<String>,
    pub readme: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl PromptMetadata {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.readme.is_none()
            && self.tags.is_none()
            && self.is_public.is_none()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRepoRequest<'a> {
    pub repo_handle: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<&'a [String]>,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRepoRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// One entry of a prompt's commit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitEntry {
    pub commit_hash: String,
    #[serde(default)]
    pub parent_commit_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub num_downloads: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitList {
    #[serde(default)]
    pub commits: Vec<CommitEntry>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCommitRequest<'a> {
    pub manifest: &'a Value,
    pub parent_commit: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCommitResponse {
    pub commit: CreatedCommit,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCommit {
    #[serde(default)]
    pub commit_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitResponse {
    pub commit_hash: String,
    pub manifest: Value,
    #[serde(default)]
    pub examples: Vec<Value>,
}

/// A pulled commit: the raw manifest plus where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct PromptCommit {
    pub owner: String,
    pub repo: String,
    pub commit_hash: String,
    pub manifest: Value,
    pub examples: Vec<Value>,
}
