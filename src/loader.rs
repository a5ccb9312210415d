//! Spec loading and internal `$ref` inlining.
//!
//! Handles loading specs from files, strings, and HTTP URLs.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{LoadError, RefError};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a spec from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_spec(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_spec_str(&content)
}

/// Load a spec from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_spec_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a spec from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status.
#[cfg(feature = "remote")]
pub fn load_spec_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(network_error)?;

    let content = response.text().map_err(network_error)?;
    load_spec_str(&content)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a spec from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_spec_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_spec_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_spec(Path::new(source))
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/definitions/Pet").
///
/// Returns `None` if any segment is missing. Array segments are indices.
pub fn navigate_fragment<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(document);
    }

    let mut current = document;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Inline internal `$ref` pointers (`#/...`) with the fragments they name.
///
/// Keys of the referenced fragment are merged into the referring object;
/// keys already present are kept. A ref that would recurse into itself is
/// left in place. External refs are left untouched.
///
/// # Errors
///
/// Returns `RefError::Unresolvable` if an internal pointer names nothing.
pub fn inline_refs(spec: &mut Value) -> Result<(), RefError> {
    let root = spec.clone();
    inline_inner(spec, &root, "", &mut Vec::new())
}

fn inline_inner(
    value: &mut Value,
    root: &Value,
    path: &str,
    visiting: &mut Vec<String>,
) -> Result<(), RefError> {
    if let Some(pointer) = internal_ref(value) {
        if visiting.contains(&pointer) {
            debug!(%pointer, %path, "left recursive ref in place");
            return Ok(());
        }

        let mut target = navigate_fragment(root, &pointer)
            .cloned()
            .ok_or_else(|| RefError::Unresolvable {
                pointer: pointer.clone(),
                path: path.to_string(),
            })?;

        visiting.push(pointer);
        inline_inner(&mut target, root, path, visiting)?;
        if let Some(pointer) = visiting.pop() {
            debug!(%pointer, %path, "inlined ref");
        }

        merge_target(value, target);
        return Ok(());
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = format!("{}/{}", path, key);
                inline_inner(child, root, &child_path, visiting)?;
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                let item_path = format!("{}/{}", path, i);
                inline_inner(item, root, &item_path, visiting)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn internal_ref(value: &Value) -> Option<String> {
    value
        .get("$ref")
        .and_then(|v| v.as_str())
        .filter(|pointer| pointer.starts_with('#'))
        .map(String::from)
}

fn merge_target(value: &mut Value, target: Value) {
    match (value, target) {
        (Value::Object(obj), Value::Object(target)) => {
            obj.remove("$ref");
            for (k, v) in target {
                obj.entry(k).or_insert(v);
            }
        }
        (value, target) => *value = target,
    }
}
