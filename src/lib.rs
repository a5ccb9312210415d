//! Swagger Models
//!
//! Model types synthesized at runtime from the `definitions` section of a
//! Swagger / JSON Schema spec.
//!
//! Compiling a spec repairs bare model refs, tags object definitions as
//! models, inlines internal `$ref` pointers and builds one [`ModelType`] per
//! definition. Instances are built from named arguments, compare structurally
//! and flatten into plain JSON for the wire.
//!
//! # Example
//!
//! ```
//! use swagger_models::{compile, CompileOptions, ModelError};
//! use serde_json::json;
//!
//! let mut spec = json!({
//!     "definitions": {
//!         "Pet": {
//!             "required": ["name"],
//!             "properties": {
//!                 "id": { "type": "integer" },
//!                 "name": { "type": "string" },
//!                 "tags": { "type": "array", "items": { "$ref": "Tag" } }
//!             }
//!         },
//!         "Tag": {
//!             "properties": {
//!                 "id": { "type": "integer" },
//!                 "name": { "type": "string" }
//!             }
//!         }
//!     }
//! });
//!
//! let models = compile(&mut spec, &CompileOptions::new()).unwrap();
//!
//! let pet = models.construct("Pet", [("name", "Rex")]).unwrap();
//! assert_eq!(pet.flatten().unwrap(), json!({ "name": "Rex", "tags": [] }));
//!
//! // Required fields are only enforced when flattening
//! let unnamed = models.construct("Pet", [("id", 1)]).unwrap();
//! assert!(matches!(unnamed.flatten(), Err(ModelError::RequiredFieldNull { .. })));
//! ```
//!
//! # Default Values
//!
//! | Declared type | Default when not supplied |
//! |---------------|---------------------------|
//! | `array` | `[]` |
//! | anything else | `null` (omitted when flattened) |

mod error;
mod loader;
mod model;
mod preprocess;
mod registry;
mod types;
mod value;

pub use error::{CompileError, LoadError, ModelError, RefError};
pub use loader::{inline_refs, load_spec, load_spec_auto, load_spec_str, navigate_fragment};
pub use model::{create_model_type, create_model_type_with, Model, ModelType};
pub use preprocess::{fix_malformed_model_refs, is_model, model_name, tag_models};
pub use registry::{
    build_models, build_models_with, compile, prepare_spec, CompileOptions, ModelRegistry,
};
pub use types::{
    definition_pointer, HostType, SwaggerTypeMapper, TypeMapper, DEFINITIONS_PREFIX,
    MODEL_MARKER, RAW_ATTRIBUTE,
};
pub use value::ModelValue;

#[cfg(feature = "remote")]
pub use loader::load_spec_url;
