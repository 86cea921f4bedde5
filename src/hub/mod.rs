//! Publishing prompts to the hub and loading them back.

pub mod model_class;
pub mod patch;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client::HubClient;
use crate::error::HubError;
use crate::load::Loader;
use crate::model::{PromptCommit, PromptIdentifier, PromptMetadata};
use crate::runnable::{Runnable, RunnableRef};

pub use model_class::{
    KNOWN_MODEL_CLASSES, ModelClass, NamedModelClass, import_map_key, known_model_imports,
};

#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    /// Commit to base the push on; `None` or `latest` means the current head.
    pub parent_commit_hash: Option<String>,
    pub is_public: Option<bool>,
    /// Older spelling of `is_public`, used only when that is unset.
    pub new_repo_is_public: Option<bool>,
    pub description: Option<String>,
    /// Older spelling of `description`, used only when that is unset.
    pub new_repo_description: Option<String>,
    pub readme: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PushOptions {
    pub fn metadata(&self) -> PromptMetadata {
        PromptMetadata {
            description: self
                .description
                .clone()
                .or_else(|| self.new_repo_description.clone()),
            readme: self.readme.clone(),
            tags: self.tags.clone(),
            is_public: self.is_public.or(self.new_repo_is_public),
        }
    }
}

#[derive(Clone, Default)]
pub struct PullOptions {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    /// Ask the hub for the model bound to the prompt as well.
    pub include_model: bool,
    /// Class to build that model with, when it is not an OpenAI model.
    pub model_class: Option<Arc<dyn ModelClass>>,
    /// Values for secrets referenced by the manifest, by name. Anything not
    /// listed is read from the environment.
    pub secrets: HashMap<String, String>,
}

impl fmt::Debug for PullOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullOptions")
            .field("api_url", &self.api_url)
            .field("include_model", &self.include_model)
            .field("model_class", &self.model_class.as_ref().map(|c| c.lc_name()))
            .field("secrets", &self.secrets.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Push `runnable` to `repo_full_name`, creating the repo if it does not exist.
/// Returns the URL of the new commit.
pub async fn push(
    repo_full_name: &str,
    runnable: &dyn Runnable,
    options: &PushOptions,
) -> Result<String, HubError> {
    let client = HubClient::from_env(options.api_url.clone(), options.api_key.clone())?;
    push_with(&client, repo_full_name, runnable, options).await
}

pub async fn push_with(
    client: &HubClient,
    repo_full_name: &str,
    runnable: &dyn Runnable,
    options: &PushOptions,
) -> Result<String, HubError> {
    let id = PromptIdentifier::parse(repo_full_name)?;
    let manifest = runnable.to_manifest();
    tracing::debug!(prompt = %id.repo_path(), class = %runnable.lc_id().join("/"), "pushing");

    client
        .push_prompt(
            &id,
            Some(&manifest),
            &options.metadata(),
            options.parent_commit_hash.as_deref(),
        )
        .await
}

/// Pull `owner/repo[:commit]` and load it into a runnable object.
pub async fn pull(owner_repo_commit: &str, options: &PullOptions) -> Result<RunnableRef, HubError> {
    let client = HubClient::from_env(options.api_url.clone(), options.api_key.clone())?;
    pull_with(&client, owner_repo_commit, options).await
}

pub async fn pull_with(
    client: &HubClient,
    owner_repo_commit: &str,
    options: &PullOptions,
) -> Result<RunnableRef, HubError> {
    let commit = pull_manifest(client, owner_repo_commit, options.include_model).await?;
    load_commit(&commit, options)
}

/// Load a pulled (and patched) commit with the loader settings in `options`.
pub fn load_commit(commit: &PromptCommit, options: &PullOptions) -> Result<RunnableRef, HubError> {
    let mut loader = Loader::new().with_secrets(options.secrets.clone());
    if let Some(class) = &options.model_class {
        loader = loader.with_imports(model_class::model_import_map(class.clone())?);
    }

    match loader.load(&commit.manifest) {
        Ok(obj) => Ok(obj),
        Err(err) if options.include_model && options.model_class.is_none() => {
            Err(HubError::ModelClassRequired {
                reason: err.to_string(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Pull a commit and apply the manifest patches, without loading it.
pub async fn pull_manifest(
    client: &HubClient,
    owner_repo_commit: &str,
    include_model: bool,
) -> Result<PromptCommit, HubError> {
    let id = PromptIdentifier::parse(owner_repo_commit)?;
    let mut commit = client.pull_prompt_commit(&id, include_model).await?;
    patch::patch_commit(&mut commit);
    tracing::info!(
        prompt = %id.repo_path(),
        commit = %commit.commit_hash,
        "pulled prompt"
    );
    Ok(commit)
}
