//! Host values held by model attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Number, Value};

use crate::model::Model;

/// Value of a single model attribute.
///
/// Plain variants mirror JSON. `Object` is a plain mapping and exposes no
/// attribute mapping, so it never compares equal to a `Model`. Numbers
/// compare by value, so `1` equals `1.0`.
#[derive(Clone)]
pub enum ModelValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ModelValue>),
    Object(BTreeMap<String, ModelValue>),
    Model(Model),
}

impl ModelValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ModelValue::Null)
    }

    /// Returns the model instance if this value is one.
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            ModelValue::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ModelValue]> {
        match self {
            ModelValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for ModelValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ModelValue::Null, ModelValue::Null) => true,
            (ModelValue::Bool(a), ModelValue::Bool(b)) => a == b,
            (ModelValue::Number(a), ModelValue::Number(b)) => {
                a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
            }
            (ModelValue::String(a), ModelValue::String(b)) => a == b,
            (ModelValue::Array(a), ModelValue::Array(b)) => a == b,
            (ModelValue::Object(a), ModelValue::Object(b)) => a == b,
            (ModelValue::Model(a), ModelValue::Model(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Null => f.write_str("null"),
            ModelValue::Bool(b) => write!(f, "{}", b),
            ModelValue::Number(n) => write!(f, "{}", n),
            ModelValue::String(s) => write!(f, "{:?}", s),
            ModelValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                f.write_str("]")
            }
            ModelValue::Object(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {:?}", key, item)?;
                }
                f.write_str("}")
            }
            ModelValue::Model(model) => write!(f, "{:?}", model),
        }
    }
}

impl From<Value> for ModelValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ModelValue::Null,
            Value::Bool(b) => ModelValue::Bool(b),
            Value::Number(n) => ModelValue::Number(n),
            Value::String(s) => ModelValue::String(s),
            Value::Array(items) => {
                ModelValue::Array(items.into_iter().map(ModelValue::from).collect())
            }
            Value::Object(map) => ModelValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ModelValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ModelValue {
    fn from(s: &str) -> Self {
        ModelValue::String(s.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(s: String) -> Self {
        ModelValue::String(s)
    }
}

impl From<bool> for ModelValue {
    fn from(b: bool) -> Self {
        ModelValue::Bool(b)
    }
}

impl From<i64> for ModelValue {
    fn from(n: i64) -> Self {
        ModelValue::Number(n.into())
    }
}

impl From<i32> for ModelValue {
    fn from(n: i32) -> Self {
        ModelValue::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for ModelValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(ModelValue::Number)
            .unwrap_or(ModelValue::Null)
    }
}

impl From<Model> for ModelValue {
    fn from(model: Model) -> Self {
        ModelValue::Model(model)
    }
}

impl<T: Into<ModelValue>> From<Vec<T>> for ModelValue {
    fn from(items: Vec<T>) -> Self {
        ModelValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ModelValue>> From<Option<T>> for ModelValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ModelValue::Null)
    }
}
