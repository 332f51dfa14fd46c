// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::document::{Document, PropertyPath};
use crate::engine::ResourceState;
use crate::errors::ProcessorError;
use crate::traits::Processor;

#[derive(Debug, Deserialize)]
struct CopyOptions {
    from: String,
    property: Value,
    #[serde(default)]
    to: Option<Value>,
}

/// Copies a property of another resource into this one.
///
/// The read goes through the resource state, so the copying resource is
/// reprocessed whenever the source changes. A source that does not exist
/// (yet) or lacks the property leaves the document unchanged.
///
/// # Options
/// * `from` - URI of the source resource
/// * `property` - path to read in the source
/// * `to` - path to write in this document; defaults to `property`
pub struct CopyProcessor;

impl CopyProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CopyProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for CopyProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        options: &Value,
    ) -> Result<Document, ProcessorError> {
        let options: CopyOptions = serde_json::from_value(options.clone())
            .map_err(|e| ProcessorError::invalid_options(self.name(), e.to_string()))?;
        let property = PropertyPath::from_value(&options.property)?;
        let to = match &options.to {
            Some(to) => PropertyPath::from_value(to)?,
            None => property.clone(),
        };

        let Some(source) = state.get_resource(&options.from) else {
            state
                .logger()
                .debug(&format!("source '{}' not loaded", options.from));
            return Ok(state.take_resource());
        };
        let Some(value) = property.get(&source).cloned() else {
            return Ok(state.take_resource());
        };

        let mut resource = state.take_resource();
        to.set(&mut resource, value)?;
        Ok(resource)
    }

    fn name(&self) -> &str {
        "copy"
    }
}
