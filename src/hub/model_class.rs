use std::fmt;
use std::sync::Arc;

use crate::error::HubError;
use crate::load::{ImportMap, Kwargs, LoadError};
use crate::runnable::{ChatModel, RunnableRef};

/// A chat model implementation the caller wants attached to a pulled prompt.
pub trait ModelClass: fmt::Debug + Send + Sync {
    /// Serialized class name, e.g. `ChatAnthropic`.
    fn lc_name(&self) -> &str;

    fn construct(&self, kwargs: Kwargs) -> Result<RunnableRef, LoadError>;
}

/// Class names accepted as model classes when pulling.
pub const KNOWN_MODEL_CLASSES: [&str; 8] = [
    "ChatAnthropic",
    "ChatAzureOpenAI",
    "ChatGoogleVertexAI",
    "ChatGoogleGenerativeAI",
    "ChatBedrockConverse",
    "ChatMistral",
    "ChatFireworks",
    "ChatGroq",
];

/// Import-map module a model class is registered under.
pub fn import_map_key(lc_name: &str) -> Option<&'static str> {
    let key = match lc_name {
        "ChatAnthropic" => "chat_models__anthropic",
        "ChatAzureOpenAI" => "chat_models__openai",
        "ChatGoogleVertexAI" => "chat_models__vertexai",
        "ChatGoogleGenerativeAI" => "chat_models__google_genai",
        "ChatBedrockConverse" => "chat_models__chat_bedrock_converse",
        "ChatMistral" => "chat_models__mistralai",
        "ChatFireworks" => "chat_models__fireworks",
        "ChatGroq" => "chat_models__groq",
        _ => return None,
    };
    Some(key)
}

/// Import map exposing `class` under its module key.
pub(crate) fn model_import_map(class: Arc<dyn ModelClass>) -> Result<ImportMap, HubError> {
    let name = class.lc_name().to_string();
    let key = import_map_key(&name).ok_or_else(|| HubError::UnsupportedModelClass { name: name.clone() })?;
    tracing::debug!(model_class = %name, key, "registering model class");

    let mut imports = ImportMap::new();
    imports.insert(key, name, Arc::new(move |kwargs: Kwargs| class.construct(kwargs)));
    Ok(imports)
}

/// Import map registering every known model class as a [`NamedModelClass`].
pub fn known_model_imports() -> ImportMap {
    let mut imports = ImportMap::new();
    for name in KNOWN_MODEL_CLASSES {
        if let Ok(class) = NamedModelClass::new(name) {
            let key = class.key;
            imports.insert(key, name, Arc::new(move |kwargs: Kwargs| class.construct(kwargs)));
        }
    }
    imports
}

/// Model class that loads the manifest's model configuration into a
/// [`ChatModel`] under a known class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedModelClass {
    name: String,
    key: &'static str,
}

impl NamedModelClass {
    pub fn new(name: impl Into<String>) -> Result<Self, HubError> {
        let name = name.into();
        let key = import_map_key(&name).ok_or_else(|| HubError::UnsupportedModelClass { name: name.clone() })?;
        Ok(Self { name, key })
    }

    /// Serialized id, e.g. `["langchain", "chat_models", "anthropic", "ChatAnthropic"]`.
    pub fn lc_id(&self) -> Vec<String> {
        std::iter::once("langchain")
            .chain(self.key.split("__"))
            .chain(std::iter::once(self.name.as_str()))
            .map(str::to_string)
            .collect()
    }
}

impl ModelClass for NamedModelClass {
    fn lc_name(&self) -> &str {
        &self.name
    }

    fn construct(&self, kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        Ok(Arc::new(ChatModel::from_kwargs(self.lc_id(), kwargs)))
    }
}
