use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Kwargs, LoadError};
use crate::runnable::{
    ChatModel, ChatPromptTemplate, MessagePromptTemplate, MessageRole, MessagesPlaceholder,
    PromptTemplate, RunnableRef, RunnableSequence,
};

/// Builds an object from its revived kwargs.
pub type Constructor = Arc<dyn Fn(Kwargs) -> Result<RunnableRef, LoadError> + Send + Sync>;

/// Module key (namespace joined with `__`, e.g. `prompts__chat`) to the
/// classes it exports.
#[derive(Clone, Default)]
pub struct ImportMap {
    modules: BTreeMap<String, BTreeMap<String, Constructor>>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, class: impl Into<String>, ctor: Constructor) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(class.into(), ctor);
    }

    pub fn with<F>(mut self, module: &str, class: &str, ctor: F) -> Self
    where
        F: Fn(Kwargs) -> Result<RunnableRef, LoadError> + Send + Sync + 'static,
    {
        self.insert(module, class, Arc::new(ctor));
        self
    }

    /// Add every class of `other`, replacing classes with the same name.
    pub fn merge(&mut self, other: ImportMap) {
        for (module, classes) in other.modules {
            self.modules.entry(module).or_default().extend(classes);
        }
    }

    pub fn module(&self, key: &str) -> Option<&BTreeMap<String, Constructor>> {
        self.modules.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Classes served under the `langchain` namespace root.
    pub(crate) fn langchain_defaults() -> Self {
        Self::new()
            .with("prompts__prompt", "PromptTemplate", PromptTemplate::construct)
            .with_chat_prompts("prompts__chat")
            .with("schema__runnable", "RunnableSequence", RunnableSequence::construct)
            .with("chat_models__openai", "ChatOpenAI", |kwargs| {
                ChatModel::construct(&["langchain", "chat_models", "openai", "ChatOpenAI"], kwargs)
            })
    }

    /// Classes served under the `langchain_core` namespace root.
    pub(crate) fn core_defaults() -> Self {
        Self::new()
            .with("prompts__prompt", "PromptTemplate", PromptTemplate::construct)
            .with_chat_prompts("prompts__chat")
            .with("runnables", "RunnableSequence", RunnableSequence::construct)
    }

    fn with_chat_prompts(self, module: &str) -> Self {
        self.with(module, "ChatPromptTemplate", ChatPromptTemplate::construct)
            .with(module, "MessagesPlaceholder", MessagesPlaceholder::construct)
            .with(module, MessageRole::Human.class_name(), |kwargs| {
                MessagePromptTemplate::construct(MessageRole::Human, kwargs)
            })
            .with(module, MessageRole::System.class_name(), |kwargs| {
                MessagePromptTemplate::construct(MessageRole::System, kwargs)
            })
            .with(module, MessageRole::Ai.class_name(), |kwargs| {
                MessagePromptTemplate::construct(MessageRole::Ai, kwargs)
            })
    }
}

impl fmt::Debug for ImportMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.modules
                    .iter()
                    .map(|(module, classes)| (module, classes.keys().collect::<Vec<_>>())),
            )
            .finish()
    }
}
