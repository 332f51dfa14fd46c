// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Document, PropertyPath};
use crate::engine::ResourceState;
use crate::errors::ProcessorError;
use crate::traits::Processor;

/// Embeds linked resources under `_embedded.<rel>`.
///
/// Links are collected at `options.property` with array flattening; each
/// link is either an href string or an object with an `href`. Every linked
/// resource is read through the resource state (recording a dependency) and
/// appended to the embedded list in link order. Links that do not resolve are
/// skipped with a warning.
///
/// `rel` defaults to the last segment of `property`.
pub struct EmbedProcessor;

impl EmbedProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmbedProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn href(link: &Value) -> Option<&str> {
    match link {
        Value::String(href) => Some(href),
        Value::Object(map) => map.get("href").and_then(Value::as_str),
        _ => None,
    }
}

#[async_trait]
impl Processor for EmbedProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        options: &Value,
    ) -> Result<Document, ProcessorError> {
        let property = options
            .get("property")
            .ok_or_else(|| ProcessorError::invalid_options(self.name(), "missing 'property'"))?;
        let property = PropertyPath::from_value(property)?;
        let rel = match options.get("rel") {
            Some(Value::String(rel)) => rel.clone(),
            Some(_) => {
                return Err(ProcessorError::invalid_options(self.name(), "'rel' must be a string"))
            }
            None => property.leaf().to_string(),
        };

        let hrefs: Vec<String> = property
            .matches(state.resource())
            .into_iter()
            .filter_map(href)
            .map(str::to_string)
            .collect();

        let logger = state.logger();
        let mut embedded = Vec::with_capacity(hrefs.len());
        for href in &hrefs {
            match state.get_resource(href) {
                Some(resource) => embedded.push(resource),
                None => logger.warn(&format!("linked resource '{}' not found", href)),
            }
        }

        let mut resource = state.take_resource();
        let embedded_path = PropertyPath::from_segments(["_embedded".to_string(), rel])?;
        embedded_path.set(&mut resource, Value::Array(embedded))?;
        Ok(resource)
    }

    fn name(&self) -> &str {
        "embed"
    }
}
