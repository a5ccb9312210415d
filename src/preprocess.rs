//! Spec preprocessing - repairs bare model refs and tags model definitions.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{definition_pointer, MODEL_MARKER};

/// Rewrite `{ "$ref": "Category" }` to `{ "$ref": "#/definitions/Category" }`.
///
/// Only refs whose value exactly matches a name declared under `definitions`
/// are rewritten; everything else is left untouched. Modifies `spec` in place.
pub fn fix_malformed_model_refs(spec: &mut Value) {
    let model_names: HashSet<String> = spec
        .get("definitions")
        .and_then(|d| d.as_object())
        .map(|defs| defs.keys().cloned().collect())
        .unwrap_or_default();

    if model_names.is_empty() {
        return;
    }

    descend(spec, &model_names);
}

fn descend(fragment: &mut Value, model_names: &HashSet<String>) {
    match fragment {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "$ref" {
                    let bare = child
                        .as_str()
                        .filter(|n| model_names.contains(*n))
                        .map(str::to_string);
                    if let Some(name) = bare {
                        let pointer = definition_pointer(&name);
                        debug!(from = %name, to = %pointer, "rewrote bare model ref");
                        *child = Value::String(pointer);
                    }
                }
                descend(child, model_names);
            }
        }
        Value::Array(items) => {
            for item in items {
                descend(item, model_names);
            }
        }
        _ => {}
    }
}

/// Tag `#/definitions` entries that are models with the model marker.
///
/// Entries without a `type` are defaulted to `"object"` first. Only
/// object-typed entries are tagged: definitions can also be primitives or
/// arrays, which do not map to a model type. An entry holding a `$ref` is an
/// alias and takes its type from the referent once inlined, so it is left
/// as is.
pub fn tag_models(spec: &mut Value) {
    let Some(defs) = spec.get_mut("definitions").and_then(|d| d.as_object_mut()) else {
        return;
    };

    for (model_name, model_spec) in defs.iter_mut() {
        let Some(model_spec) = model_spec.as_object_mut() else {
            warn!(model = %model_name, "definition is not an object, not tagged");
            continue;
        };

        if model_spec.contains_key("$ref") {
            debug!(model = %model_name, "alias definition, not tagged");
            continue;
        }

        let model_type = model_spec
            .entry("type")
            .or_insert_with(|| Value::String("object".to_string()));

        if model_type.as_str() == Some("object") {
            model_spec.insert(
                MODEL_MARKER.to_string(),
                Value::String(model_name.clone()),
            );
            debug!(model = %model_name, "tagged model");
        }
    }
}

/// Returns true if the fragment carries the model marker.
pub fn is_model(fragment: &Value) -> bool {
    fragment
        .as_object()
        .map(|map| map.contains_key(MODEL_MARKER))
        .unwrap_or(false)
}

/// Returns the model name recorded by the model marker, if any.
pub fn model_name(fragment: &Value) -> Option<&str> {
    fragment.get(MODEL_MARKER).and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === Reference Repair Tests ===

    #[test]
    fn fix_refs_rewrites_bare_model_name() {
        let mut spec = json!({
            "definitions": {
                "Category": { "properties": { "id": { "type": "integer" } } },
                "Pet": {
                    "properties": { "category": { "$ref": "Category" } }
                }
            }
        });
        fix_malformed_model_refs(&mut spec);

        assert_eq!(
            spec["definitions"]["Pet"]["properties"]["category"]["$ref"],
            "#/definitions/Category"
        );
    }

    #[test]
    fn fix_refs_leaves_unknown_names() {
        let mut spec = json!({
            "definitions": { "Category": { "properties": {} } },
            "paths": { "/pets": { "schema": { "$ref": "Unknown" } } }
        });
        fix_malformed_model_refs(&mut spec);

        assert_eq!(spec["paths"]["/pets"]["schema"]["$ref"], "Unknown");
    }

    #[test]
    fn fix_refs_leaves_canonical_pointers() {
        let mut spec = json!({
            "definitions": { "Category": { "properties": {} } },
            "paths": { "schema": { "$ref": "#/definitions/Category" } }
        });
        fix_malformed_model_refs(&mut spec);

        assert_eq!(spec["paths"]["schema"]["$ref"], "#/definitions/Category");
    }

    #[test]
    fn fix_refs_descends_into_arrays() {
        let mut spec = json!({
            "definitions": { "Tag": { "properties": {} } },
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [
                            { "name": "a", "schema": { "items": { "$ref": "Tag" } } },
                            [{ "$ref": "Tag" }]
                        ]
                    }
                }
            }
        });
        fix_malformed_model_refs(&mut spec);

        let params = &spec["paths"]["/pets"]["get"]["parameters"];
        assert_eq!(params[0]["schema"]["items"]["$ref"], "#/definitions/Tag");
        assert_eq!(params[1][0]["$ref"], "#/definitions/Tag");
    }

    #[test]
    fn fix_refs_ignores_non_ref_keys_with_model_values() {
        let mut spec = json!({
            "definitions": { "Tag": { "properties": {} } },
            "info": { "title": "Tag" }
        });
        fix_malformed_model_refs(&mut spec);

        assert_eq!(spec["info"]["title"], "Tag");
    }

    #[test]
    fn fix_refs_without_definitions_is_noop() {
        let mut spec = json!({ "paths": { "schema": { "$ref": "Pet" } } });
        let before = spec.clone();
        fix_malformed_model_refs(&mut spec);
        assert_eq!(spec, before);
    }

    // === Tagging Tests ===

    #[test]
    fn tag_defaults_missing_type_to_object() {
        let mut spec = json!({
            "definitions": { "Pet": { "properties": {} } }
        });
        tag_models(&mut spec);

        let pet = &spec["definitions"]["Pet"];
        assert_eq!(pet["type"], "object");
        assert_eq!(pet[MODEL_MARKER], "Pet");
        assert!(is_model(pet));
    }

    #[test]
    fn tag_skips_non_object_types() {
        let mut spec = json!({
            "definitions": {
                "Id": { "type": "integer" },
                "Tags": { "type": "array", "items": { "type": "string" } }
            }
        });
        tag_models(&mut spec);

        assert!(!is_model(&spec["definitions"]["Id"]));
        assert!(!is_model(&spec["definitions"]["Tags"]));
        assert_eq!(spec["definitions"]["Id"]["type"], "integer");
    }

    #[test]
    fn tag_keeps_explicit_object_type() {
        let mut spec = json!({
            "definitions": { "Order": { "type": "object", "properties": {} } }
        });
        tag_models(&mut spec);

        assert_eq!(model_name(&spec["definitions"]["Order"]), Some("Order"));
    }

    #[test]
    fn tag_skips_non_object_definitions() {
        let mut spec = json!({ "definitions": { "Broken": "not a schema" } });
        tag_models(&mut spec);

        assert_eq!(spec["definitions"]["Broken"], "not a schema");
    }

    #[test]
    fn tag_skips_ref_alias_definitions() {
        let mut spec = json!({
            "definitions": {
                "Id": { "type": "integer" },
                "Key": { "$ref": "#/definitions/Id" }
            }
        });
        tag_models(&mut spec);

        assert_eq!(spec["definitions"]["Key"], json!({ "$ref": "#/definitions/Id" }));
        assert!(!is_model(&spec["definitions"]["Key"]));
    }

    #[test]
    fn is_model_on_plain_fragments() {
        assert!(!is_model(&json!({ "type": "object" })));
        assert!(!is_model(&json!("x-model")));
        assert!(is_model(&json!({ "x-model": "Pet" })));
    }
}
