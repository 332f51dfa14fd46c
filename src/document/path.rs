// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dotted-or-array property paths over [`Document`] trees.
//!
//! A path is a list of segments. It can be written as a dotted string
//! (`"author.name"`) or given as an explicit array (`["author", "name"]`),
//! which allows keys that themselves contain dots.
//!
//! Three access modes are supported:
//!
//! * [`PropertyPath::get`] - strict lookup; arrays are only entered through
//!   numeric segments.
//! * [`PropertyPath::set`] - write, creating intermediate objects as needed.
//! * [`PropertyPath::matches`] - lookup with array flattening: whenever the
//!   walk meets an array where a key is expected, it continues into every
//!   element, and arrays found at the end of the path are flattened into
//!   their elements.

use std::fmt;

use serde_json::{Map, Value};

use crate::document::Document;
use crate::errors::PathError;

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dotted path. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::EmptyPath);
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Build a path from explicit segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::EmptyPath);
        }
        Ok(Self { segments })
    }

    /// Read a path out of processor or dynamic-resource options.
    ///
    /// Accepts either a dotted string or an array of strings.
    pub fn from_value(value: &Value) -> Result<Self, PathError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Array(items) => {
                let segments = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        Value::Number(n) => Ok(n.to_string()),
                        other => Err(PathError::InvalidPath {
                            path: other.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::from_segments(segments)
            }
            other => Err(PathError::InvalidPath {
                path: other.to_string(),
            }),
        }
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, used to name things derived from the path.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Strict lookup.
    pub fn get<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate objects.
    ///
    /// Scalars (and `null`) met along the way are replaced by objects. Arrays
    /// can only be entered through numeric segments; writing past the end
    /// pads the array with `null`.
    pub fn set(&self, doc: &mut Document, value: Value) -> Result<(), PathError> {
        let (last, parents) = self
            .segments
            .split_last()
            .ok_or(PathError::EmptyPath)?;

        let mut current = doc;
        for segment in parents {
            current = child_mut(current, segment)?;
        }

        match current {
            Value::Array(items) => {
                let index = array_index(last)?;
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
            other => {
                if !other.is_object() {
                    *other = Value::Object(Map::new());
                }
                if let Value::Object(map) = other {
                    map.insert(last.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Lookup with array flattening.
    ///
    /// Returns every leaf value reachable through the path, in document
    /// order. Duplicates are preserved; callers collapse them as needed.
    pub fn matches<'a>(&self, doc: &'a Document) -> Vec<&'a Value> {
        let mut current = vec![doc];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                descend(value, segment, &mut next);
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        let mut leaves = Vec::new();
        for value in current {
            flatten_into(value, &mut leaves);
        }
        leaves
    }
}

fn descend<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(segment) {
                out.push(child);
            }
        }
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => {
                if let Some(child) = items.get(index) {
                    out.push(child);
                }
            }
            Err(_) => {
                for item in items {
                    descend(item, segment, out);
                }
            }
        },
        _ => {}
    }
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

fn child_mut<'a>(current: &'a mut Value, segment: &str) -> Result<&'a mut Value, PathError> {
    if !(current.is_object() || current.is_array()) {
        *current = Value::Object(Map::new());
    }
    let child = match current {
        Value::Array(items) => {
            let index = array_index(segment)?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        _ => {
            return Err(PathError::NotTraversable {
                segment: segment.to_string(),
            })
        }
    };
    if !(child.is_object() || child.is_array()) {
        *child = Value::Object(Map::new());
    }
    Ok(child)
}

fn array_index(segment: &str) -> Result<usize, PathError> {
    segment.parse::<usize>().map_err(|_| PathError::NotAnIndex {
        segment: segment.to_string(),
    })
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl std::str::FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
