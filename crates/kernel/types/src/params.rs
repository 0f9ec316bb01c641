use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Dynamic tool-call parameter value.
///
/// Tool handlers declare duck-typed parameter bags; the kernel represents
/// them as an explicit tagged union so validation is a tag comparison, not
/// reflection. `Object` uses a `BTreeMap` so key order is canonical by
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An explicitly absent value. Dropped from objects during
    /// canonicalization so its presence never changes a digest.
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
}

/// Declared type tag for a schema parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Number => write!(f, "number"),
            ParamType::Boolean => write!(f, "boolean"),
            ParamType::Array => write!(f, "array"),
            ParamType::Object => write!(f, "object"),
        }
    }
}

/// A bag of named tool-call parameters.
pub type ParamMap = BTreeMap<String, ParamValue>;

impl ParamValue {
    /// The runtime type tag, or `None` for `Null`.
    ///
    /// Array detection is explicit: an `Array` never reports as any other
    /// type, so a string-typed field rejects an array outright.
    pub fn param_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Null => None,
            ParamValue::Bool(_) => Some(ParamType::Boolean),
            ParamValue::Number(_) => Some(ParamType::Number),
            ParamValue::String(_) => Some(ParamType::String),
            ParamValue::Array(_) => Some(ParamType::Array),
            ParamValue::Object(_) => Some(ParamType::Object),
        }
    }

    /// Name of the runtime type for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    /// Canonical form: object keys sorted (by construction) and
    /// `Null`-valued object fields recursively dropped. Array elements are
    /// preserved, including nulls, since position is significant there.
    pub fn canonicalize(&self) -> ParamValue {
        match self {
            ParamValue::Object(map) => ParamValue::Object(
                map.iter()
                    .filter(|(_, v)| !matches!(v, ParamValue::Null))
                    .map(|(k, v)| (k.clone(), v.canonicalize()))
                    .collect(),
            ),
            ParamValue::Array(items) => {
                ParamValue::Array(items.iter().map(|v| v.canonicalize()).collect())
            }
            other => other.clone(),
        }
    }

    /// Serialized canonical JSON. Deterministic for a given value because
    /// object keys are sorted and floats format stably.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.canonicalize()).unwrap_or_else(|_| "null".to_string())
    }

    /// Serialized size in bytes of the canonical form.
    pub fn serialized_size(&self) -> usize {
        self.canonical_json().len()
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => ParamValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => ParamValue::String(s),
            serde_json::Value::Array(items) => {
                ParamValue::Array(items.into_iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(map) => ParamValue::Object(
                map.into_iter().map(|(k, v)| (k, ParamValue::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

/// Content-addressed digest of a tool call.
///
/// A pure function of `(tool, params)`: key order and explicitly-null
/// fields never change the result. Rendered as 64 lowercase hex characters
/// (blake3, 256 bits).
pub fn canonical_digest(tool: &str, params: &ParamMap) -> String {
    let canonical = ParamValue::Object(params.clone()).canonical_json();
    let mut hasher = blake3::Hasher::new();
    hasher.update(tool.as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical.as_bytes());
    hasher.finalize().to_hex().to_string()
}
