use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::load::LoadError;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory: {path}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to determine config directory; set XDG_CONFIG_HOME or --config-dir")]
    ConfigDirNotFound,

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid prompt identifier '{identifier}'")]
    InvalidIdentifier { identifier: String },

    #[error("request to the hub failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to {context}: {status} {body}")]
    Api {
        context: String,
        status: StatusCode,
        body: String,
    },

    #[error("conflict while trying to {context}: {body}")]
    Conflict { context: String, body: String },

    #[error("unexpected response while trying to {context}: {reason}")]
    InvalidResponse { context: String, reason: String },

    #[error("prompt '{identifier}' does not exist, you must create it first")]
    PromptNotFound { identifier: String },

    #[error(
        "cannot create a public prompt without first creating a hub handle; \
         set one in your account settings"
    )]
    HandleRequired,

    #[error("cannot {action} for another tenant.\nCurrent tenant: {current},\nRequested tenant: {requested}")]
    OwnerConflict {
        action: String,
        current: String,
        requested: String,
    },

    #[error("no valid update options provided")]
    NothingToUpdate,

    #[error("received unsupported model class '{name}' when pulling prompt")]
    UnsupportedModelClass { name: String },

    #[error("{reason}\n\nTo load prompts with an associated non-OpenAI model, pass a model class when pulling: set `PullOptions::model_class` or run `prompthub pull <prompt> --include-model --model-class ChatAnthropic`")]
    ModelClassRequired { reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),
}
