//! Object graph a pulled manifest is loaded into.

mod chat_model;
pub mod format;
mod prompts;
mod sequence;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::load::serialized;

pub use chat_model::ChatModel;
pub use format::TemplateFormat;
pub use prompts::{
    ChatMessage, ChatMessageTemplate, ChatPromptTemplate, MessagePromptTemplate, MessageRole,
    MessagesPlaceholder, PromptTemplate,
};
pub use sequence::RunnableSequence;

pub type RunnableRef = Arc<dyn Runnable>;

/// An object that can be pushed to and pulled from the hub.
pub trait Runnable: fmt::Debug + Send + Sync + 'static {
    /// Namespace path plus class name, e.g.
    /// `["langchain", "prompts", "chat", "ChatPromptTemplate"]`.
    fn lc_id(&self) -> Vec<String>;

    fn lc_kwargs(&self) -> Map<String, Value>;

    fn as_any(&self) -> &dyn Any;

    fn metadata(&self) -> Option<&Map<String, Value>> {
        None
    }

    fn to_manifest(&self) -> Value {
        serialized::constructor(&self.lc_id(), self.lc_kwargs())
    }
}

impl dyn Runnable {
    pub fn downcast_ref<T: Runnable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn class_name(&self) -> String {
        self.lc_id().pop().unwrap_or_default()
    }

    /// String entry of the object's metadata.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata()?.get(key)?.as_str()
    }
}

pub(crate) fn lc_id(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

pub(crate) fn insert_metadata(kwargs: &mut Map<String, Value>, metadata: &Option<Map<String, Value>>) {
    if let Some(metadata) = metadata {
        kwargs.insert("metadata".to_string(), Value::Object(metadata.clone()));
    }
}
