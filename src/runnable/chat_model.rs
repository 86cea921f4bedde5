use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Runnable, RunnableRef};
use crate::load::{Kwargs, LoadError, Revived, Secret};
use crate::load::serialized;

/// Configuration of a chat model bound to a prompt.
///
/// This holds what the manifest says about the model (class, parameters and
/// credentials); it does not talk to any provider.
#[derive(Clone, PartialEq)]
pub struct ChatModel {
    id: Vec<String>,
    pub kwargs: Map<String, Value>,
    secrets: BTreeMap<String, Secret>,
}

impl ChatModel {
    pub fn new(id: Vec<String>) -> Self {
        Self {
            id,
            kwargs: Map::new(),
            secrets: BTreeMap::new(),
        }
    }

    /// Build from revived kwargs, splitting secrets out of the plain values.
    pub fn from_kwargs(id: Vec<String>, kwargs: Kwargs) -> Self {
        let mut model = Self::new(id);
        for (key, value) in kwargs.into_entries() {
            match value {
                Revived::Secret(secret) => {
                    model.secrets.insert(key, secret);
                }
                other => {
                    model.kwargs.insert(key, other.to_json());
                }
            }
        }
        model
    }

    pub(crate) fn construct(id: &[&str], kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        let id = id.iter().map(|p| p.to_string()).collect();
        Ok(Arc::new(Self::from_kwargs(id, kwargs)))
    }

    pub fn class_name(&self) -> &str {
        self.id.last().map(String::as_str).unwrap_or_default()
    }

    /// The configured model, from `model` or `model_name`.
    pub fn model_name(&self) -> Option<&str> {
        self.kwargs
            .get("model")
            .or_else(|| self.kwargs.get("model_name"))
            .and_then(Value::as_str)
    }

    /// Resolved value of a credential field, e.g. `anthropic_api_key`.
    pub fn secret(&self, field: &str) -> Option<&str> {
        self.secrets.get(field)?.value.as_deref()
    }

    /// Store a credential as a reference to `name`.
    pub fn with_secret(mut self, field: impl Into<String>, name: impl Into<String>, value: Option<String>) -> Self {
        self.secrets.insert(
            field.into(),
            Secret {
                name: name.into(),
                value,
            },
        );
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("class", &self.class_name())
            .field("kwargs", &self.kwargs)
            .field("secrets", &self.secrets)
            .finish()
    }
}

impl Runnable for ChatModel {
    fn lc_id(&self) -> Vec<String> {
        self.id.clone()
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = self.kwargs.clone();
        for (field, secret) in &self.secrets {
            kwargs.insert(field.clone(), serialized::secret(&secret.name));
        }
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
