// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Schema-free documents and the property-path utilities used to read and
//! write them.
//!
//! A [`Document`] is any JSON-compatible value. Resources are expected to be
//! objects, but nothing in the engine enforces a schema: processors receive
//! whatever tree was loaded and may return any tree back.
//!
//! # Reserved properties
//!
//! * `_processors` - the local processor worklist, consumed during processing
//! * `_links` / `_embedded` - hypermedia conventions used by built-in processors

pub mod path;

use serde_json::{Map, Value};

pub use path::PropertyPath;

/// A structured document tracked by the engine.
pub type Document = Value;

/// Property holding the local processor worklist of a document.
pub const PROCESSORS_PROPERTY: &str = "_processors";

/// An empty object document.
pub fn empty_document() -> Document {
    Value::Object(Map::new())
}

/// Serialize a matched value into an index key.
///
/// Strings are used verbatim, other scalars by their JSON text and
/// composite values by canonical JSON (object keys sorted). `null` has no key.
pub fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(canonicalize(value).to_string()),
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Recursively merge `source` into `target`.
///
/// Objects merge key by key; any other value in `source` replaces the one in
/// `target`.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(t), Value::Object(s)) => {
            for (key, value) in s {
                match t.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        t.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (t, s) => *t = s.clone(),
    }
}
