use serde_json::{Map, Value, json};

/// Version of the serialization format every node is tagged with.
pub const LC_VERSION: u64 = 1;

/// A node of the serialized object format, as found inside a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized<'a> {
    Constructor {
        id: Vec<&'a str>,
        kwargs: Option<&'a Map<String, Value>>,
    },
    Secret {
        id: Vec<&'a str>,
    },
    NotImplemented {
        id: Vec<&'a str>,
    },
}

impl<'a> Serialized<'a> {
    /// Recognize a serialized node: an object with `lc == 1`, a known string
    /// `type` and a string-array `id`. Anything else is plain data.
    pub fn detect(value: &'a Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.get("lc").and_then(Value::as_u64) != Some(LC_VERSION) {
            return None;
        }
        let kind = obj.get("type")?.as_str()?;
        let id = obj
            .get("id")?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()?;

        match kind {
            "constructor" => Some(Self::Constructor {
                id,
                kwargs: obj.get("kwargs").and_then(Value::as_object),
            }),
            "secret" => Some(Self::Secret { id }),
            "not_implemented" => Some(Self::NotImplemented { id }),
            _ => None,
        }
    }
}

/// Serialized form of an object built by the class at `id`.
pub fn constructor(id: &[String], kwargs: Map<String, Value>) -> Value {
    json!({
        "lc": LC_VERSION,
        "type": "constructor",
        "id": id,
        "kwargs": kwargs,
    })
}

/// Serialized reference to a secret, resolved by name at load time.
pub fn secret(name: &str) -> Value {
    json!({
        "lc": LC_VERSION,
        "type": "secret",
        "id": [name],
    })
}
