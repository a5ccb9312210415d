//! Model registry and the compile pipeline over a whole spec.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{CompileError, ModelError};
use crate::loader::inline_refs;
use crate::model::{create_model_type_with, Model, ModelType};
use crate::preprocess::{fix_malformed_model_refs, tag_models};
use crate::types::{definition_pointer, json_type_name, SwaggerTypeMapper, TypeMapper};
use crate::value::ModelValue;

/// Model types by name.
///
/// Every model is registered under its bare name (`Pet`) and its canonical
/// pointer (`#/definitions/Pet`); both keys hold the same `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<ModelType>>,
}

/// Build the models contained in a `#/definitions` object.
///
/// # Errors
///
/// Returns `ModelError::MalformedSchema` if `definitions` is not an object or
/// any entry is malformed.
pub fn build_models(definitions: &Value) -> Result<ModelRegistry, ModelError> {
    build_models_with(definitions, Arc::new(SwaggerTypeMapper))
}

/// Build the models of a `#/definitions` object with a custom type mapper.
pub fn build_models_with(
    definitions: &Value,
    mapper: Arc<dyn TypeMapper>,
) -> Result<ModelRegistry, ModelError> {
    let Some(defs) = definitions.as_object() else {
        return Err(ModelError::MalformedSchema {
            model: "definitions".to_string(),
            message: format!("expected object, got {}", json_type_name(definitions)),
        });
    };

    let mut models = BTreeMap::new();
    for (model_name, model_spec) in defs {
        let model_type = Arc::new(create_model_type_with(
            model_name,
            model_spec,
            Arc::clone(&mapper),
        )?);
        debug!(model = %model_name, properties = model_type.properties().len(), "registered model");
        models.insert(definition_pointer(model_name), Arc::clone(&model_type));
        models.insert(model_name.clone(), model_type);
    }

    Ok(ModelRegistry { models })
}

impl ModelRegistry {
    /// Look up a model by bare name or canonical pointer.
    pub fn get(&self, name: &str) -> Option<&Arc<ModelType>> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Number of registered keys (two per model).
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Bare model names, sorted.
    pub fn model_names(&self) -> Vec<&str> {
        self.models
            .keys()
            .filter(|k| !k.starts_with('#'))
            .map(String::as_str)
            .collect()
    }

    /// Construct an instance of the named model.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownModel` if no model is registered under
    /// `name`, or any construction error.
    pub fn construct<I, K, V>(&self, name: &str, args: I) -> Result<Model, ModelError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ModelValue>,
    {
        self.models
            .get(name)
            .ok_or_else(|| ModelError::UnknownModel {
                name: name.to_string(),
            })?
            .construct(args)
    }
}

/// Options for compiling a spec into a registry.
#[derive(Clone)]
pub struct CompileOptions {
    /// Inline internal `$ref` pointers before building models.
    pub inline_refs: bool,
    /// Type mapper used by every model.
    pub mapper: Arc<dyn TypeMapper>,
}

impl CompileOptions {
    /// Inlining on, Swagger type mapping.
    pub fn new() -> Self {
        Self {
            inline_refs: true,
            mapper: Arc::new(SwaggerTypeMapper),
        }
    }

    pub fn inline_refs(mut self, inline_refs: bool) -> Self {
        self.inline_refs = inline_refs;
        self
    }

    pub fn mapper(mut self, mapper: Arc<dyn TypeMapper>) -> Self {
        self.mapper = mapper;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("inline_refs", &self.inline_refs)
            .finish_non_exhaustive()
    }
}

/// Prepare a spec in place: repair bare refs, tag models, and optionally
/// inline internal refs.
pub fn prepare_spec(spec: &mut Value, options: &CompileOptions) -> Result<(), CompileError> {
    fix_malformed_model_refs(spec);
    tag_models(spec);
    if options.inline_refs {
        inline_refs(spec)?;
    }
    Ok(())
}

/// Compile a spec into a model registry.
///
/// Runs [`prepare_spec`] then builds every entry of `definitions`. A spec
/// without `definitions` yields an empty registry.
pub fn compile(spec: &mut Value, options: &CompileOptions) -> Result<ModelRegistry, CompileError> {
    prepare_spec(spec, options)?;

    let registry = match spec.get("definitions") {
        Some(definitions) => build_models_with(definitions, Arc::clone(&options.mapper))?,
        None => ModelRegistry::default(),
    };
    debug!(models = registry.model_names().len(), "compiled spec");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostType;
    use serde_json::json;

    fn petstore() -> Value {
        json!({
            "swagger": "2.0",
            "definitions": {
                "Pet": {
                    "required": ["name"],
                    "properties": {
                        "id": { "type": "integer" },
                        "name": { "type": "string" },
                        "category": { "$ref": "Category" },
                        "tags": { "type": "array", "items": { "$ref": "#/definitions/Tag" } }
                    }
                },
                "Tag": {
                    "properties": {
                        "id": { "type": "integer" },
                        "name": { "type": "string" }
                    }
                },
                "Category": {
                    "properties": { "name": { "type": "string" } }
                },
                "PetIds": { "type": "array", "items": { "type": "integer" } }
            }
        })
    }

    #[test]
    fn build_registers_both_names_with_same_descriptor() {
        let registry = build_models(&petstore()["definitions"]).unwrap();

        let bare = registry.get("Pet").unwrap();
        let pointer = registry.get("#/definitions/Pet").unwrap();
        assert!(Arc::ptr_eq(bare, pointer));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn build_covers_non_object_definitions() {
        let registry = build_models(&petstore()["definitions"]).unwrap();
        let ids = registry.get("PetIds").unwrap();
        assert!(ids.properties().is_empty());
    }

    #[test]
    fn build_rejects_non_object_definitions() {
        let result = build_models(&json!(["Pet"]));
        assert!(matches!(result, Err(ModelError::MalformedSchema { .. })));
    }

    #[test]
    fn model_names_are_bare_and_sorted() {
        let registry = build_models(&petstore()["definitions"]).unwrap();
        assert_eq!(registry.model_names(), ["Category", "Pet", "PetIds", "Tag"]);
    }

    #[test]
    fn compile_resolves_repaired_refs_to_models() {
        let mut spec = petstore();
        let registry = compile(&mut spec, &CompileOptions::new()).unwrap();

        let pet = registry.get("Pet").unwrap();
        assert_eq!(pet.host_types()["category"], HostType::Model("Category".into()));
        assert_eq!(
            spec["definitions"]["Pet"]["properties"]["tags"]["items"]["x-model"],
            "Tag"
        );
    }

    #[test]
    fn compile_without_inlining_keeps_refs() {
        let mut spec = petstore();
        let options = CompileOptions::new().inline_refs(false);
        let registry = compile(&mut spec, &options).unwrap();

        assert_eq!(
            spec["definitions"]["Pet"]["properties"]["category"]["$ref"],
            "#/definitions/Category"
        );
        let pet = registry.get("Pet").unwrap();
        assert_eq!(pet.host_types()["category"], HostType::Model("Category".into()));
    }

    #[test]
    fn compile_resolves_alias_definitions_to_referent() {
        let mut spec = json!({
            "definitions": {
                "Id": { "type": "integer" },
                "Key": { "$ref": "#/definitions/Id" },
                "Tag": { "properties": { "id": { "$ref": "#/definitions/Key" } } }
            }
        });
        let registry = compile(&mut spec, &CompileOptions::new()).unwrap();

        assert_eq!(spec["definitions"]["Key"], json!({ "type": "integer" }));
        let tag = registry.get("Tag").unwrap();
        assert_eq!(tag.host_types()["id"], HostType::Integer);
    }

    #[test]
    fn compile_without_definitions_is_empty() {
        let mut spec = json!({ "swagger": "2.0", "paths": {} });
        let registry = compile(&mut spec, &CompileOptions::default()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_construct_by_either_name() {
        let mut spec = petstore();
        let registry = compile(&mut spec, &CompileOptions::new()).unwrap();

        let a = registry.construct("Tag", [("id", 1)]).unwrap();
        let b = registry.construct("#/definitions/Tag", [("id", 1)]).unwrap();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(a.model_type(), b.model_type()));
    }

    #[test]
    fn registry_construct_unknown_model() {
        let registry = ModelRegistry::default();
        let result = registry.construct("Owner", [("id", 1)]);
        assert!(matches!(
            result,
            Err(ModelError::UnknownModel { name }) if name == "Owner"
        ));
    }
}
