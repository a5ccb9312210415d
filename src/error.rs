//! Error types for schema preparation, model synthesis and instances.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a spec document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while inlining `$ref` pointers.
#[derive(Debug, Error)]
pub enum RefError {
    #[error("unresolvable reference {pointer} at {path}")]
    Unresolvable { pointer: String, path: String },
}

/// Errors raised by model synthesis, construction and flattening.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{} are not defined for {model}", format_keys(keys))]
    UnknownProperty { model: String, keys: Vec<String> },

    #[error("required field {property} of {model} can not be null")]
    RequiredFieldNull { model: String, property: String },

    #[error("malformed schema for model {model}: {message}")]
    MalformedSchema { model: String, message: String },

    #[error("unknown model: {name}")]
    UnknownModel { name: String },

    #[error("arguments for {model} must be an object, got {actual}")]
    InvalidArguments { model: String, actual: String },
}

/// Errors from the full compile pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

fn format_keys(keys: &[String]) -> String {
    let quoted: Vec<String> = keys.iter().map(|k| format!("'{}'", k)).collect();
    format!("[{}]", quoted.join(", "))
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

impl RefError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl ModelError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedSchema { .. } => 2,
            _ => 1,
        }
    }
}

impl CompileError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Load(e) => e.exit_code(),
            CompileError::Ref(e) => e.exit_code(),
            CompileError::Model(e) => e.exit_code(),
        }
    }
}
