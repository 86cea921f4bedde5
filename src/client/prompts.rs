use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::{HubClient, raise_for_status, read_json};
use crate::error::HubError;
use crate::model::identifier::{LATEST_COMMIT, SELF_OWNER};
use crate::model::prompt::{
    CommitResponse, CreateCommitRequest, CreateCommitResponse, CreateRepoRequest, RepoResponse,
    UpdateRepoRequest,
};
use crate::model::{CommitList, PromptCommit, PromptIdentifier, PromptMetadata, Repo};

impl HubClient {
    /// Fetch a prompt repo; `None` when the hub does not know it.
    pub async fn get_prompt(&self, id: &PromptIdentifier) -> Result<Option<Repo>, HubError> {
        let response = self
            .request(Method::GET, &format!("/repos/{}", id.repo_path()))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = raise_for_status(response, "get prompt").await?;
        let body: RepoResponse = read_json(response, "get prompt").await?;
        Ok(body.repo)
    }

    pub async fn prompt_exists(&self, id: &PromptIdentifier) -> Result<bool, HubError> {
        Ok(self.get_prompt(id).await?.is_some())
    }

    pub async fn create_prompt(
        &self,
        id: &PromptIdentifier,
        meta: &PromptMetadata,
    ) -> Result<Repo, HubError> {
        let is_public = meta.is_public.unwrap_or(false);
        if is_public && self.settings().await?.tenant_handle.is_none() {
            return Err(HubError::HandleRequired);
        }
        self.ensure_owner(&id.owner, "create a prompt").await?;

        let body = CreateRepoRequest {
            repo_handle: &id.repo,
            description: meta.description.as_deref(),
            readme: meta.readme.as_deref(),
            tags: meta.tags.as_deref(),
            is_public,
        };
        tracing::info!(prompt = %id.repo_path(), is_public, "creating prompt");
        let response = self
            .send(self.request(Method::POST, "/repos/").json(&body), "create prompt")
            .await?;
        let body: RepoResponse = read_json(response, "create prompt").await?;
        body.repo.ok_or_else(|| HubError::InvalidResponse {
            context: "create prompt".to_string(),
            reason: "response did not contain a repo".to_string(),
        })
    }

    pub async fn update_prompt(
        &self,
        id: &PromptIdentifier,
        meta: &PromptMetadata,
    ) -> Result<(), HubError> {
        self.ensure_owner(&id.owner, "update a prompt").await?;
        if meta.is_empty() {
            return Err(HubError::NothingToUpdate);
        }

        let body = UpdateRepoRequest {
            description: meta.description.as_deref(),
            readme: meta.readme.as_deref(),
            tags: meta.tags.as_deref(),
            is_public: meta.is_public,
        };
        tracing::info!(prompt = %id.repo_path(), "updating prompt metadata");
        self.send(
            self.request(Method::PATCH, &format!("/repos/{}", id.repo_path()))
                .json(&body),
            "update prompt",
        )
        .await?;
        Ok(())
    }

    pub async fn list_commits(
        &self,
        id: &PromptIdentifier,
        limit: u32,
        offset: u32,
    ) -> Result<CommitList, HubError> {
        let req = self
            .request(Method::GET, &format!("/commits/{}/", id.repo_path()))
            .query(&[("limit", limit), ("offset", offset)]);
        let response = self.send(req, "list commits").await?;
        read_json(response, "list commits").await
    }

    pub async fn latest_commit_hash(&self, id: &PromptIdentifier) -> Result<Option<String>, HubError> {
        let list = self.list_commits(id, 1, 0).await?;
        Ok(list.commits.into_iter().next().map(|c| c.commit_hash))
    }

    /// Commit a manifest to an existing prompt and return the commit's URL.
    pub async fn create_commit(
        &self,
        id: &PromptIdentifier,
        manifest: &Value,
        parent_commit_hash: Option<&str>,
    ) -> Result<String, HubError> {
        if !self.prompt_exists(id).await? {
            return Err(HubError::PromptNotFound {
                identifier: id.repo_path(),
            });
        }

        let parent = match parent_commit_hash {
            None | Some(LATEST_COMMIT) => self.latest_commit_hash(id).await?,
            Some(hash) => Some(hash.to_string()),
        };
        tracing::debug!(prompt = %id.repo_path(), parent = ?parent, "creating commit");

        let body = CreateCommitRequest {
            manifest,
            parent_commit: parent.as_deref(),
        };
        let response = self
            .send(
                self.request(Method::POST, &format!("/commits/{}", id.repo_path()))
                    .json(&body),
                "create commit",
            )
            .await?;
        let created: CreateCommitResponse = read_json(response, "create commit").await?;

        let committed = match created.commit.commit_hash {
            Some(hash) => id.with_commit(hash),
            None => id.with_commit(LATEST_COMMIT),
        };
        tracing::info!(prompt = %committed, "pushed commit");
        self.prompt_url(&committed).await
    }

    /// Fetch one commit's manifest. `include_model` asks the hub to keep the
    /// model bound to the prompt in the manifest.
    pub async fn pull_prompt_commit(
        &self,
        id: &PromptIdentifier,
        include_model: bool,
    ) -> Result<PromptCommit, HubError> {
        let mut req = self.request(
            Method::GET,
            &format!("/commits/{}/{}", id.repo_path(), id.commit),
        );
        if include_model {
            req = req.query(&[("include_model", "true")]);
        }
        tracing::debug!(prompt = %id, include_model, "pulling commit");

        let response = self.send(req, "pull prompt commit").await?;
        let body: CommitResponse = read_json(response, "pull prompt commit").await?;
        Ok(PromptCommit {
            owner: id.owner.clone(),
            repo: id.repo.clone(),
            commit_hash: body.commit_hash,
            manifest: body.manifest,
            examples: body.examples,
        })
    }

    /// Create or update the prompt repo, then commit `manifest` to it if given.
    /// Returns the URL of the new commit, or of the prompt when nothing was
    /// committed.
    pub async fn push_prompt(
        &self,
        id: &PromptIdentifier,
        manifest: Option<&Value>,
        meta: &PromptMetadata,
        parent_commit_hash: Option<&str>,
    ) -> Result<String, HubError> {
        if self.prompt_exists(id).await? {
            if !meta.is_empty() {
                self.update_prompt(id, meta).await?;
            }
        } else {
            self.create_prompt(id, meta).await?;
        }

        match manifest {
            Some(manifest) => self.create_commit(id, manifest, parent_commit_hash).await,
            None => self.prompt_url(id).await,
        }
    }

    /// Web URL for a prompt or one of its commits.
    pub async fn prompt_url(&self, id: &PromptIdentifier) -> Result<String, HubError> {
        let host = self.host_url();
        if !self.is_current_tenant(&id.owner).await? {
            return Ok(format!(
                "{host}/hub/{}/{}:{}",
                id.owner,
                id.repo,
                id.short_commit()
            ));
        }

        let settings = self.settings().await?;
        if id.is_latest() {
            Ok(format!(
                "{host}/prompts/{}?organizationId={}",
                id.repo, settings.id
            ))
        } else {
            Ok(format!(
                "{host}/prompts/{}/{}?organizationId={}",
                id.repo,
                id.short_commit(),
                settings.id
            ))
        }
    }

    async fn is_current_tenant(&self, owner: &str) -> Result<bool, HubError> {
        if owner == SELF_OWNER {
            return Ok(true);
        }
        let settings = self.settings().await?;
        Ok(settings.tenant_handle.as_deref() == Some(owner))
    }

    async fn ensure_owner(&self, owner: &str, action: &str) -> Result<(), HubError> {
        if self.is_current_tenant(owner).await? {
            return Ok(());
        }
        let settings = self.settings().await?;
        Err(HubError::OwnerConflict {
            action: action.to_string(),
            current: settings.tenant_handle.clone().unwrap_or_default(),
            requested: owner.to_string(),
        })
    }
}
