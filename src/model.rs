//! Model types synthesized from `#/definitions` schemas, and their instances.
//!
//! A [`ModelType`] is a plain descriptor: the declared property schemas, the
//! host type each one resolves to and the required-property names. Instances
//! ([`Model`]) are records keyed by property name that share their descriptor.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use swagger_models::create_model_type;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "id": { "type": "integer" },
//!         "name": { "type": "string" },
//!         "photoUrls": { "type": "array", "items": { "type": "string" } }
//!     }
//! });
//! let pet_type = Arc::new(create_model_type("Pet", &schema).unwrap());
//!
//! let pet = pet_type.construct([("name", "Rex")]).unwrap();
//! assert_eq!(format!("{:?}", pet), r#"Pet(id=null, name="Rex", photoUrls=[])"#);
//! assert_eq!(pet.flatten().unwrap(), json!({ "name": "Rex", "photoUrls": [] }));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::preprocess::model_name;
use crate::types::{json_type_name, HostType, SwaggerTypeMapper, TypeMapper, RAW_ATTRIBUTE};
use crate::value::ModelValue;

/// Descriptor for one model, shared by every instance built from it.
pub struct ModelType {
    name: String,
    properties: Map<String, Value>,
    host_types: BTreeMap<String, HostType>,
    required: Option<Vec<String>>,
    mapper: Arc<dyn TypeMapper>,
}

/// Create a model type from its schema using [`SwaggerTypeMapper`].
///
/// # Errors
///
/// Returns `ModelError::MalformedSchema` if the schema is not an object, or
/// if `properties` or `required` have the wrong shape.
pub fn create_model_type(model_name: &str, model_spec: &Value) -> Result<ModelType, ModelError> {
    create_model_type_with(model_name, model_spec, Arc::new(SwaggerTypeMapper))
}

/// Create a model type from its schema with a custom type mapper.
///
/// A schema without `properties` yields a model with no properties, so
/// primitive and array definitions still get a descriptor.
pub fn create_model_type_with(
    model_name: &str,
    model_spec: &Value,
    mapper: Arc<dyn TypeMapper>,
) -> Result<ModelType, ModelError> {
    let malformed = |message: String| ModelError::MalformedSchema {
        model: model_name.to_string(),
        message,
    };

    let Some(spec) = model_spec.as_object() else {
        return Err(malformed(format!(
            "expected object, got {}",
            json_type_name(model_spec)
        )));
    };

    let properties = match spec.get("properties") {
        None => Map::new(),
        Some(Value::Object(props)) => props.clone(),
        Some(other) => {
            return Err(malformed(format!(
                "properties must be an object, got {}",
                json_type_name(other)
            )))
        }
    };

    let required = match spec.get("required") {
        None => None,
        Some(Value::Array(names)) => {
            let names: Option<Vec<String>> = names
                .iter()
                .map(|n| n.as_str().map(String::from))
                .collect();
            Some(names.ok_or_else(|| malformed("required must list strings".to_string()))?)
        }
        Some(other) => {
            return Err(malformed(format!(
                "required must be an array, got {}",
                json_type_name(other)
            )))
        }
    };

    let host_types = properties
        .iter()
        .map(|(name, prop)| (name.clone(), mapper.host_type(prop)))
        .collect();

    Ok(ModelType {
        name: model_name.to_string(),
        properties,
        host_types,
        required,
        mapper,
    })
}

impl ModelType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared property schemas, verbatim from `properties`.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Host type of each declared property, ordered by property name.
    pub fn host_types(&self) -> &BTreeMap<String, HostType> {
        &self.host_types
    }

    /// Required property names, verbatim from `required`. Empty if absent.
    pub fn required(&self) -> &[String] {
        self.required.as_deref().unwrap_or_default()
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required().iter().any(|r| r == property)
    }

    /// Build an instance from named arguments.
    ///
    /// Every declared property is assigned the supplied value or, when absent,
    /// the mapper's default for its host type. Required fields are not checked
    /// here; see [`Model::flatten`].
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownProperty` naming every argument that is not
    /// a declared property.
    pub fn construct<I, K, V>(self: &Arc<Self>, args: I) -> Result<Model, ModelError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ModelValue>,
    {
        let mut pending: BTreeMap<String, ModelValue> = args
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut attributes = BTreeMap::new();
        for (prop_name, host_type) in &self.host_types {
            let value = match pending.remove(prop_name) {
                Some(value) => value,
                None => self.mapper.default_value(host_type),
            };
            attributes.insert(prop_name.clone(), value);
        }

        if !pending.is_empty() {
            return Err(ModelError::UnknownProperty {
                model: self.name.clone(),
                keys: pending.into_keys().collect(),
            });
        }

        Ok(Model {
            model_type: Arc::clone(self),
            attributes,
            raw: None,
        })
    }

    /// Build an instance from a JSON object of arguments.
    ///
    /// Values are converted shallowly: nested objects stay plain mappings.
    pub fn construct_json(self: &Arc<Self>, args: &Value) -> Result<Model, ModelError> {
        let Some(map) = args.as_object() else {
            return Err(ModelError::InvalidArguments {
                model: self.name.clone(),
                actual: json_type_name(args).to_string(),
            });
        };
        self.construct(map.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Structural equality between two values; see [`Model`]'s `PartialEq`.
    pub fn equals(&self, first: &ModelValue, second: &ModelValue) -> bool {
        match (first, second) {
            (ModelValue::Model(a), ModelValue::Model(b)) => a == b,
            _ => false,
        }
    }

    /// Human-readable summary of the model: one line per declared property
    /// with its declared type, marking required ones.
    ///
    /// ```text
    /// Pet
    ///
    /// Attributes:
    ///     id: integer
    ///     name: string (required)
    ///     tags: array of Tag
    /// ```
    pub fn docstring(&self) -> String {
        let mut doc = format!("{}\n\nAttributes:", self.name);
        for prop_name in self.host_types.keys() {
            let declared = self
                .properties
                .get(prop_name)
                .map(declared_type)
                .unwrap_or_else(|| "any".to_string());
            doc.push_str(&format!("\n    {}: {}", prop_name, declared));
            if self.is_required(prop_name) {
                doc.push_str(" (required)");
            }
        }
        doc
    }

    pub fn represent(&self, model: &Model) -> String {
        format!("{:?}", model)
    }

    pub fn flatten(&self, model: &Model) -> Result<Value, ModelError> {
        model.flatten()
    }
}

/// Declared type of a property schema as written in the spec.
fn declared_type(schema: &Value) -> String {
    if let Some(name) = model_name(schema) {
        return name.to_string();
    }
    if let Some(pointer) = schema.get("$ref").and_then(|r| r.as_str()) {
        return pointer.rsplit('/').next().unwrap_or(pointer).to_string();
    }
    match schema.get("type").and_then(|t| t.as_str()) {
        Some("array") => match schema.get("items") {
            Some(items) => format!("array of {}", declared_type(items)),
            None => "array".to_string(),
        },
        Some(type_name) => type_name.to_string(),
        None => "any".to_string(),
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("host_types", &self.host_types)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// An instance of a [`ModelType`].
///
/// Holds one attribute per declared property. The property set is fixed by
/// the descriptor; values may be reassigned with [`Model::set`].
#[derive(Clone)]
pub struct Model {
    model_type: Arc<ModelType>,
    attributes: BTreeMap<String, ModelValue>,
    raw: Option<Value>,
}

impl Model {
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    pub fn name(&self) -> &str {
        self.model_type.name()
    }

    pub fn get(&self, property: &str) -> Option<&ModelValue> {
        self.attributes.get(property)
    }

    /// All attributes, ordered by property name.
    pub fn attributes(&self) -> &BTreeMap<String, ModelValue> {
        &self.attributes
    }

    /// Reassign a declared property, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownProperty` if `property` is not declared.
    pub fn set(
        &mut self,
        property: &str,
        value: impl Into<ModelValue>,
    ) -> Result<ModelValue, ModelError> {
        match self.attributes.get_mut(property) {
            Some(slot) => Ok(std::mem::replace(slot, value.into())),
            None => Err(ModelError::UnknownProperty {
                model: self.name().to_string(),
                keys: vec![property.to_string()],
            }),
        }
    }

    /// Original payload this instance was built from, if recorded.
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    pub fn set_raw(&mut self, raw: Value) {
        self.raw = Some(raw);
    }

    /// Convert into plain nested JSON for serialization.
    ///
    /// Nested models are flattened recursively. Null elements are dropped
    /// from array properties and null properties are omitted.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::RequiredFieldNull` if a required property is null,
    /// here or in any nested model.
    pub fn flatten(&self) -> Result<Value, ModelError> {
        let mut flat = Map::new();
        for (name, value) in &self.attributes {
            match value {
                ModelValue::Array(items) => {
                    let items = items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(flatten_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    flat.insert(name.clone(), Value::Array(items));
                }
                ModelValue::Null => {
                    if self.model_type.is_required(name) {
                        return Err(ModelError::RequiredFieldNull {
                            model: self.name().to_string(),
                            property: name.clone(),
                        });
                    }
                }
                other => {
                    flat.insert(name.clone(), flatten_value(other)?);
                }
            }
        }
        Ok(Value::Object(flat))
    }
}

/// Values without an attribute mapping pass through as-is; only models inside
/// them are flattened.
fn flatten_value(value: &ModelValue) -> Result<Value, ModelError> {
    Ok(match value {
        ModelValue::Null => Value::Null,
        ModelValue::Bool(b) => Value::Bool(*b),
        ModelValue::Number(n) => Value::Number(n.clone()),
        ModelValue::String(s) => Value::String(s.clone()),
        ModelValue::Array(items) => Value::Array(
            items
                .iter()
                .map(flatten_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        ModelValue::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), flatten_value(item)?);
            }
            Value::Object(out)
        }
        ModelValue::Model(model) => model.flatten()?,
    })
}

/// Attributes are compared by name and value, ignoring raw-payload
/// bookkeeping. The descriptor is not compared: instances of different
/// models with the same attributes are equal.
impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        let visible = |(name, _): &(&String, &ModelValue)| name.as_str() != RAW_ATTRIBUTE;
        self.attributes
            .iter()
            .filter(visible)
            .eq(other.attributes.iter().filter(visible))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, prop) in self.model_type.host_types.keys().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.attributes.get(prop) {
                Some(value) => write!(f, "{}={:?}", prop, value)?,
                None => write!(f, "{}=null", prop)?,
            }
        }
        f.write_str(")")
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.flatten()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
