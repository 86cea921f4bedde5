//! Rebuilds runnable objects from serialized manifests.
//!
//! A manifest is JSON in which objects are encoded as
//! `{"lc": 1, "type": "constructor", "id": [...namespace, Class], "kwargs": {...}}`.
//! The namespace root picks an [`ImportMap`] (`langchain` or `langchain_core`);
//! the rest of the namespace is joined with `__` and shortened from the right
//! until a module key matches.

mod import_map;
mod kwargs;
pub mod serialized;

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use thiserror::Error;

use crate::runnable::format::FormatError;
use crate::runnable::RunnableRef;

pub use import_map::{Constructor, ImportMap};
pub use kwargs::{Kwargs, Revived, Secret};
pub use serialized::Serialized;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid namespace: {path} -> {id}")]
    InvalidNamespace { path: String, id: String },

    #[error("invalid identifier: {path} -> {id}")]
    InvalidIdentifier { path: String, id: String },

    #[error("missing secret \"{name}\" at {path}; provide it to the loader or set it in the environment")]
    MissingSecret { name: String, path: String },

    #[error("trying to load an object that doesn't implement serialization: {path} -> {id}")]
    NotImplemented { path: String, id: String },

    #[error("manifest root is not a serialized object")]
    NotAnObject,

    #[error("{class}: missing required field '{field}'")]
    MissingField { class: String, field: String },

    #[error("{class}: field '{field}' must be {expected}, found {found}")]
    InvalidField {
        class: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

pub struct Loader {
    langchain: ImportMap,
    core: ImportMap,
    secrets: HashMap<String, String>,
    secrets_from_env: bool,
    require_secrets: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            langchain: ImportMap::langchain_defaults(),
            core: ImportMap::core_defaults(),
            secrets: HashMap::new(),
            secrets_from_env: true,
            require_secrets: true,
        }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }

    pub fn with_secrets(mut self, secrets: impl IntoIterator<Item = (String, String)>) -> Self {
        self.secrets.extend(secrets);
        self
    }

    /// Whether secrets not given explicitly are looked up in the environment.
    pub fn secrets_from_env(mut self, enabled: bool) -> Self {
        self.secrets_from_env = enabled;
        self
    }

    /// When disabled, unresolved secrets load with no value instead of failing.
    /// The reference itself is kept, so the object still serializes faithfully.
    pub fn require_secrets(mut self, required: bool) -> Self {
        self.require_secrets = required;
        self
    }

    /// Extra classes for the `langchain` namespace root.
    pub fn with_imports(mut self, imports: ImportMap) -> Self {
        self.langchain.merge(imports);
        self
    }

    pub fn load_str(&self, text: &str) -> Result<RunnableRef, LoadError> {
        let value: Value = serde_json::from_str(text)?;
        self.load(&value)
    }

    pub fn load(&self, manifest: &Value) -> Result<RunnableRef, LoadError> {
        match self.revive(manifest, "$")? {
            Revived::Object(obj) => Ok(obj),
            _ => Err(LoadError::NotAnObject),
        }
    }

    fn revive(&self, value: &Value, path: &str) -> Result<Revived, LoadError> {
        if let Some(node) = Serialized::detect(value) {
            return self.revive_node(node, path);
        }

        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.revive(item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Revived::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.revive(item, &format!("{path}.{key}"))?)))
                .collect::<Result<BTreeMap<_, _>, LoadError>>()
                .map(Revived::Map),
            leaf => Ok(Revived::Value(leaf.clone())),
        }
    }

    fn revive_node(&self, node: Serialized<'_>, path: &str) -> Result<Revived, LoadError> {
        match node {
            Serialized::Secret { id } => {
                let name = id.first().copied().unwrap_or_default();
                Ok(Revived::Secret(self.resolve_secret(name, path)?))
            }
            Serialized::NotImplemented { id } => Err(LoadError::NotImplemented {
                path: path.to_string(),
                id: id.join("/"),
            }),
            Serialized::Constructor { id, kwargs } => {
                let ctor = self.resolve_class(&id, path)?;
                let mut entries = BTreeMap::new();
                for (key, item) in kwargs.into_iter().flatten() {
                    entries.insert(key.clone(), self.revive(item, &format!("{path}.kwargs.{key}"))?);
                }
                let class = id.last().copied().unwrap_or_default();
                tracing::trace!(path, class, "constructing");
                ctor(Kwargs::new(class, entries)).map(Revived::Object)
            }
        }
    }

    fn resolve_secret(&self, name: &str, path: &str) -> Result<Secret, LoadError> {
        let value = self.secrets.get(name).cloned().or_else(|| {
            self.secrets_from_env
                .then(|| std::env::var(name).ok())
                .flatten()
        });
        if value.is_none() && self.require_secrets {
            return Err(LoadError::MissingSecret {
                name: name.to_string(),
                path: path.to_string(),
            });
        }
        Ok(Secret {
            name: name.to_string(),
            value,
        })
    }

    fn resolve_class(&self, id: &[&str], path: &str) -> Result<&Constructor, LoadError> {
        let invalid_namespace = || LoadError::InvalidNamespace {
            path: path.to_string(),
            id: id.join("/"),
        };

        let (class, namespace) = id.split_last().ok_or_else(invalid_namespace)?;
        let (root, rest) = namespace.split_first().ok_or_else(invalid_namespace)?;
        let imports = match *root {
            "langchain" => &self.langchain,
            "langchain_core" => &self.core,
            _ => return Err(invalid_namespace()),
        };

        let module = (1..=rest.len())
            .rev()
            .find_map(|len| imports.module(&rest[..len].join("__")))
            .ok_or_else(invalid_namespace)?;

        module.get(*class).ok_or_else(|| LoadError::InvalidIdentifier {
            path: path.to_string(),
            id: id.join("/"),
        })
    }
}

/// Load a manifest with the default classes, resolving secrets from the
/// environment.
pub fn load(manifest: &Value) -> Result<RunnableRef, LoadError> {
    Loader::new().load(manifest)
}
