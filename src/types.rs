//! Core types: schema markers and the primitive type mapper.

use serde_json::Value;

use crate::value::ModelValue;

/// Key attached to `#/definitions` entries that map to a model type.
///
/// Its value is the model's own name, so fragments stay recognizable after
/// `$ref` inlining.
pub const MODEL_MARKER: &str = "x-model";

/// Prefix of canonical reference pointers into the definitions section.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Attribute name reserved for raw-payload bookkeeping; ignored by equality.
pub const RAW_ATTRIBUTE: &str = "_raw";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Canonical reference pointer for a model name.
pub fn definition_pointer(name: &str) -> String {
    format!("{}{}", DEFINITIONS_PREFIX, name)
}

/// Host type a property schema resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    /// Free-form mapping (an `object` that is not a tagged model).
    Object,
    File,
    /// A model, by bare name.
    Model(String),
    /// No declared type.
    Any,
}

impl HostType {
    /// Parse a schema primitive type name.
    ///
    /// Returns `None` for unknown names (caller decides the fallback).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(HostType::Integer),
            "number" => Some(HostType::Number),
            "string" => Some(HostType::String),
            "boolean" => Some(HostType::Boolean),
            "array" => Some(HostType::Array),
            "object" => Some(HostType::Object),
            "file" => Some(HostType::File),
            _ => None,
        }
    }
}

/// Maps property schemas to host types and their default values.
pub trait TypeMapper: Send + Sync {
    /// Resolve the host type of a property schema.
    fn host_type(&self, property: &Value) -> HostType;

    /// Default value for a property that was not supplied at construction.
    fn default_value(&self, host_type: &HostType) -> ModelValue;
}

/// Swagger 2.0 primitive mapping.
///
/// Arrays default to an empty array, everything else to `Null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerTypeMapper;

impl TypeMapper for SwaggerTypeMapper {
    fn host_type(&self, property: &Value) -> HostType {
        if let Some(name) = property.get(MODEL_MARKER).and_then(|v| v.as_str()) {
            return HostType::Model(name.to_string());
        }

        if let Some(pointer) = property.get("$ref").and_then(|v| v.as_str()) {
            let name = pointer.rsplit('/').next().unwrap_or(pointer);
            return HostType::Model(name.to_string());
        }

        property
            .get("type")
            .and_then(|t| t.as_str())
            .and_then(HostType::parse)
            .unwrap_or(HostType::Any)
    }

    fn default_value(&self, host_type: &HostType) -> ModelValue {
        match host_type {
            HostType::Array => ModelValue::Array(Vec::new()),
            _ => ModelValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn host_type_from_primitive_types() {
        let mapper = SwaggerTypeMapper;
        assert_eq!(mapper.host_type(&json!({ "type": "integer" })), HostType::Integer);
        assert_eq!(
            mapper.host_type(&json!({ "type": "string", "format": "date-time" })),
            HostType::String
        );
        assert_eq!(
            mapper.host_type(&json!({ "type": "array", "items": { "type": "string" } })),
            HostType::Array
        );
    }

    #[test]
    fn host_type_prefers_model_marker() {
        let mapper = SwaggerTypeMapper;
        let prop = json!({ "type": "object", "x-model": "Category", "properties": {} });
        assert_eq!(mapper.host_type(&prop), HostType::Model("Category".into()));
    }

    #[test]
    fn host_type_from_unresolved_ref() {
        let mapper = SwaggerTypeMapper;
        let prop = json!({ "$ref": "#/definitions/Node" });
        assert_eq!(mapper.host_type(&prop), HostType::Model("Node".into()));
    }

    #[test]
    fn host_type_untyped_is_any() {
        let mapper = SwaggerTypeMapper;
        assert_eq!(mapper.host_type(&json!({})), HostType::Any);
        assert_eq!(mapper.host_type(&json!({ "type": "uuid" })), HostType::Any);
    }

    #[test]
    fn defaults() {
        let mapper = SwaggerTypeMapper;
        assert_eq!(mapper.default_value(&HostType::Array), ModelValue::Array(vec![]));
        assert!(mapper.default_value(&HostType::Integer).is_null());
        assert!(mapper.default_value(&HostType::Model("Tag".into())).is_null());
    }

    #[test]
    fn definition_pointer_format() {
        assert_eq!(definition_pointer("Pet"), "#/definitions/Pet");
    }
}
