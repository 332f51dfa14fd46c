// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Property-value index: a derived document mapping every value found at a
//! property to the URIs of the resources carrying it.
//!
//! The index is maintained incrementally. On each processed resource only
//! the difference between its previous and current values is applied, and
//! when that difference is empty nothing is republished. This is what stops
//! the index from reacting to its own publication.
//!
//! # Published document
//! ```json
//! {
//!   "_links": {"profile": [{"href": "/schema/index"}, {"href": "/schema/index/tags"}]},
//!   "property": "tags",
//!   "index": {"rust": ["/posts/a.json", "/posts/b.json"]}
//! }
//! ```
//! It is published at `/<property segments joined by '/'><suffix>`, e.g.
//! `/tags.json` or `/meta/author.json`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::document::{index_key, Document, PropertyPath};
use crate::engine::DynamicResourceApi;
use crate::errors::DynamicResourceError;
use crate::traits::{DynamicResource, DynamicResourceDefinition};

pub const INDEX_PROFILE: &str = "/schema/index";

/// Definition registered as `index`. Options: `{property}`, a dotted path or
/// an array of segments.
pub struct IndexDefinition;

impl DynamicResourceDefinition for IndexDefinition {
    fn name(&self) -> &str {
        "index"
    }

    fn instantiate(&self, options: &Value) -> Result<Box<dyn DynamicResource>, DynamicResourceError> {
        let property = options
            .get("property")
            .ok_or_else(|| DynamicResourceError::InvalidOptions {
                name: self.name().to_string(),
                message: "missing 'property'".to_string(),
            })?;
        Ok(Box::new(PropertyIndex::new(PropertyPath::from_value(property)?)))
    }
}

pub struct PropertyIndex {
    property: PropertyPath,
    index: BTreeMap<String, BTreeSet<String>>,
    reverse_index: HashMap<String, BTreeSet<String>>,
}

impl PropertyIndex {
    pub fn new(property: PropertyPath) -> Self {
        Self {
            property,
            index: BTreeMap::new(),
            reverse_index: HashMap::new(),
        }
    }

    /// URI the index document is published at. The suffix is appended
    /// explicitly so a segment containing a dot is not read as an extension.
    pub fn uri(&self, suffix: &str) -> String {
        format!("/{}{}", self.property.segments().join("/"), suffix)
    }

    fn values_of(&self, resource: &Document) -> BTreeSet<String> {
        self.property
            .matches(resource)
            .into_iter()
            .filter_map(index_key)
            .collect()
    }

    fn insert(&mut self, uri: &str, value: &str) {
        self.index
            .entry(value.to_string())
            .or_default()
            .insert(uri.to_string());
        self.reverse_index
            .entry(uri.to_string())
            .or_default()
            .insert(value.to_string());
    }

    fn remove(&mut self, uri: &str, value: &str) {
        if let Some(uris) = self.index.get_mut(value) {
            uris.remove(uri);
            if uris.is_empty() {
                self.index.remove(value);
            }
        }
        if let Some(values) = self.reverse_index.get_mut(uri) {
            values.remove(value);
            if values.is_empty() {
                self.reverse_index.remove(uri);
            }
        }
    }

    /// Apply the current values of `uri`. Returns whether anything changed.
    fn update(&mut self, uri: &str, values: BTreeSet<String>) -> bool {
        let previous = self.reverse_index.get(uri).cloned().unwrap_or_default();
        let added: Vec<&String> = values.difference(&previous).collect();
        let removed: Vec<&String> = previous.difference(&values).collect();
        if added.is_empty() && removed.is_empty() {
            return false;
        }

        for value in removed {
            self.remove(uri, value);
        }
        for value in added {
            self.insert(uri, value);
        }
        true
    }

    fn forget(&mut self, uri: &str) {
        let values = self.reverse_index.remove(uri).unwrap_or_default();
        for value in &values {
            if let Some(uris) = self.index.get_mut(value) {
                uris.remove(uri);
                if uris.is_empty() {
                    self.index.remove(value);
                }
            }
        }
    }

    pub fn render(&self) -> Document {
        let index: Map<String, Value> = self
            .index
            .iter()
            .map(|(value, uris)| (value.clone(), json!(uris)))
            .collect();
        json!({
            "_links": {
                "profile": [
                    {"href": INDEX_PROFILE},
                    {"href": format!("{}/{}", INDEX_PROFILE, self.property.segments().join("/"))}
                ]
            },
            "property": self.property.to_string(),
            "index": index,
        })
    }

    async fn publish(&self, api: &DynamicResourceApi) {
        let uri = self.uri(&api.engine().config().default_suffix);
        api.create_resource(&uri, self.render()).await;
    }
}

#[async_trait]
impl DynamicResource for PropertyIndex {
    async fn init(&mut self, _api: &DynamicResourceApi) -> anyhow::Result<()> {
        self.index.clear();
        self.reverse_index.clear();
        Ok(())
    }

    async fn on_resource_process(
        &mut self,
        uri: &str,
        resource: &Document,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        let values = self.values_of(resource);
        if self.update(uri, values) {
            self.publish(api).await;
        }
        Ok(())
    }

    async fn on_resource_delete(
        &mut self,
        uri: &str,
        _resource: &Document,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        self.forget(uri);
        self.publish(api).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> PropertyIndex {
        PropertyIndex::new(PropertyPath::parse("tags").unwrap())
    }

    #[test]
    fn test_update_applies_differences() {
        let mut index = tags();
        assert!(index.update("/a.json", index.values_of(&json!({"tags": ["x", "y", "x"]}))));
        assert!(index.update("/b.json", index.values_of(&json!({"tags": "y"}))));
        assert!(!index.update("/a.json", index.values_of(&json!({"tags": ["y", "x"]}))));

        assert!(index.update("/a.json", index.values_of(&json!({"tags": ["y", "z"]}))));
        assert_eq!(
            index.render()["index"],
            json!({"y": ["/a.json", "/b.json"], "z": ["/a.json"]})
        );
    }

    #[test]
    fn test_resources_without_the_property_are_no_ops() {
        let mut index = tags();
        assert!(!index.update("/a.json", index.values_of(&json!({"title": "t"}))));
        assert!(index.reverse_index.is_empty());
    }

    #[test]
    fn test_forget_prunes_empty_entries() {
        let mut index = tags();
        index.update("/a.json", index.values_of(&json!({"tags": ["x", "y"]})));
        index.update("/b.json", index.values_of(&json!({"tags": ["y"]})));

        index.forget("/a.json");
        assert_eq!(index.render()["index"], json!({"y": ["/b.json"]}));
        assert!(!index.reverse_index.contains_key("/a.json"));
    }

    #[test]
    fn test_composite_values_serialize_canonically() {
        let mut index = PropertyIndex::new(PropertyPath::parse("meta.author").unwrap());
        index.update(
            "/a.json",
            index.values_of(&json!({"meta": [{"author": {"last": "Lee", "first": "Ann"}}, {"author": 3}]})),
        );
        assert_eq!(
            index.render()["index"],
            json!({"3": ["/a.json"], r#"{"first":"Ann","last":"Lee"}"#: ["/a.json"]})
        );
    }

    #[test]
    fn test_render_and_uri() {
        let index = PropertyIndex::new(PropertyPath::parse("meta.author").unwrap());
        assert_eq!(index.uri(".json"), "/meta/author.json");
        assert_eq!(
            index.render(),
            json!({
                "_links": {"profile": [{"href": "/schema/index"}, {"href": "/schema/index/meta/author"}]},
                "property": "meta.author",
                "index": {}
            })
        );
    }

    #[test]
    fn test_uri_with_dotted_segment_keeps_suffix() {
        let index = PropertyIndex::new(PropertyPath::from_value(&json!(["a.b"])).unwrap());
        let uri = index.uri(".json");
        assert_eq!(uri, "/a.b.json");
        assert_eq!(crate::graph::UriNormalizer::default().normalize(&uri), uri);
    }

    #[test]
    fn test_definition_requires_property() {
        assert!(IndexDefinition.instantiate(&json!({})).is_err());
        assert!(IndexDefinition.instantiate(&json!({"property": "tags"})).is_ok());
    }
}
