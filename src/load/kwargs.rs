use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::LoadError;
use super::serialized;
use crate::runnable::{Runnable, RunnableRef};

/// A kwargs value after loading: plain JSON, a constructed object, a resolved
/// secret, or containers of those.
#[derive(Debug, Clone)]
pub enum Revived {
    Value(Value),
    Array(Vec<Revived>),
    Map(BTreeMap<String, Revived>),
    Object(RunnableRef),
    Secret(Secret),
}

/// A secret resolved at load time. Serializes back to a reference by name so
/// the value never ends up in a manifest.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    pub name: String,
    pub value: Option<String>,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("value", &self.value.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Revived {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Array(items) => Value::Array(items.iter().map(Revived::to_json).collect()),
            Self::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Object(obj) => obj.to_manifest(),
            Self::Secret(secret) => serialized::secret(&secret.name),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Value(Value::String(_)) => "a string",
            Self::Value(Value::Bool(_)) => "a boolean",
            Self::Value(Value::Null) => "null",
            Self::Value(_) => "a value",
            Self::Array(_) => "an array",
            Self::Map(_) => "an object",
            Self::Object(_) => "a serialized object",
            Self::Secret(_) => "a secret",
        }
    }
}

/// Constructor arguments for one class. Accessors take the entry out so that
/// whatever is left can be kept verbatim.
#[derive(Debug)]
pub struct Kwargs {
    class: String,
    entries: BTreeMap<String, Revived>,
}

impl Kwargs {
    pub fn new(class: impl Into<String>, entries: BTreeMap<String, Revived>) -> Self {
        Self {
            class: class.into(),
            entries,
        }
    }

    /// Build kwargs from plain JSON, with no nested objects or secrets.
    pub fn from_json(class: impl Into<String>, kwargs: &Map<String, Value>) -> Self {
        Self::new(
            class,
            kwargs
                .iter()
                .map(|(k, v)| (k.clone(), Revived::Value(v.clone())))
                .collect(),
        )
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn take(&mut self, key: &str) -> Option<Revived> {
        match self.entries.remove(key) {
            Some(Revived::Value(Value::Null)) | None => None,
            other => other,
        }
    }

    pub fn string(&mut self, key: &str) -> Result<Option<String>, LoadError> {
        match self.take(key) {
            None => Ok(None),
            Some(Revived::Value(Value::String(s))) => Ok(Some(s)),
            Some(other) => Err(self.invalid(key, "a string", &other)),
        }
    }

    pub fn required_string(&mut self, key: &str) -> Result<String, LoadError> {
        self.string(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn bool(&mut self, key: &str) -> Result<Option<bool>, LoadError> {
        match self.take(key) {
            None => Ok(None),
            Some(Revived::Value(Value::Bool(b))) => Ok(Some(b)),
            Some(other) => Err(self.invalid(key, "a boolean", &other)),
        }
    }

    /// A list of strings; absent means empty.
    pub fn strings(&mut self, key: &str) -> Result<Vec<String>, LoadError> {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Revived::Value(Value::Array(items))) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(self.invalid(key, "an array of strings", &Revived::Value(other))),
                })
                .collect(),
            Some(Revived::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Revived::Value(Value::String(s)) => Ok(s),
                    other => Err(self.invalid(key, "an array of strings", &other)),
                })
                .collect(),
            Some(other) => Err(self.invalid(key, "an array of strings", &other)),
        }
    }

    /// A plain JSON object such as `metadata`.
    pub fn json_map(&mut self, key: &str) -> Result<Option<Map<String, Value>>, LoadError> {
        match self.take(key) {
            None => Ok(None),
            Some(Revived::Value(Value::Object(map))) => Ok(Some(map)),
            Some(Revived::Map(entries)) => Ok(Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            )),
            Some(other) => Err(self.invalid(key, "an object", &other)),
        }
    }

    pub fn object(&mut self, key: &str) -> Result<Option<RunnableRef>, LoadError> {
        match self.take(key) {
            None => Ok(None),
            Some(Revived::Object(obj)) => Ok(Some(obj)),
            Some(other) => Err(self.invalid(key, "a serialized object", &other)),
        }
    }

    pub fn required_object(&mut self, key: &str) -> Result<RunnableRef, LoadError> {
        self.object(key)?.ok_or_else(|| self.missing(key))
    }

    /// A list of serialized objects; absent means empty.
    pub fn objects(&mut self, key: &str) -> Result<Vec<RunnableRef>, LoadError> {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Revived::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Revived::Object(obj) => Ok(obj),
                    other => Err(self.invalid(key, "an array of serialized objects", &other)),
                })
                .collect(),
            Some(Revived::Value(Value::Array(items))) if items.is_empty() => Ok(Vec::new()),
            Some(other) => Err(self.invalid(key, "an array of serialized objects", &other)),
        }
    }

    /// Downcast an object entry to a concrete type.
    pub fn downcast<T: Runnable + Clone>(&self, key: &str, obj: &RunnableRef) -> Result<T, LoadError> {
        obj.downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| LoadError::InvalidField {
                class: self.class.clone(),
                field: key.to_string(),
                expected: std::any::type_name::<T>()
                    .rsplit("::")
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                found: obj.class_name().to_string(),
            })
    }

    pub fn into_entries(self) -> BTreeMap<String, Revived> {
        self.entries
    }

    fn missing(&self, key: &str) -> LoadError {
        LoadError::MissingField {
            class: self.class.clone(),
            field: key.to_string(),
        }
    }

    fn invalid(&self, key: &str, expected: &str, found: &Revived) -> LoadError {
        LoadError::InvalidField {
            class: self.class.clone(),
            field: key.to_string(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }
}
