// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{deep_merge, Document, PROCESSORS_PROPERTY};
use crate::engine::ResourceState;
use crate::errors::ProcessorError;
use crate::traits::Processor;

/// Deep-merges `options.with` into the document.
///
/// `_processors` entries in `with` are appended to the document's own
/// worklist instead of replacing it, so `extend` can queue further passes.
///
/// # Options
/// ```yaml
/// name: extend
/// options:
///   with:
///     layout: post
///     _processors: [self]
/// ```
pub struct ExtendProcessor;

impl ExtendProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtendProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for ExtendProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        options: &Value,
    ) -> Result<Document, ProcessorError> {
        let Some(Value::Object(with)) = options.get("with") else {
            return Err(ProcessorError::invalid_options(
                self.name(),
                "'with' must be an object",
            ));
        };
        let mut with = with.clone();
        let queued = with.remove(PROCESSORS_PROPERTY);

        let mut resource = state.take_resource();
        deep_merge(&mut resource, &Value::Object(with));

        if let (Some(queued), Value::Object(map)) = (queued, &mut resource) {
            let worklist = map
                .entry(PROCESSORS_PROPERTY)
                .or_insert_with(|| Value::Array(Vec::new()));
            match (worklist, queued) {
                (Value::Array(entries), Value::Array(more)) => entries.extend(more),
                (Value::Array(entries), single) => entries.push(single),
                (other, queued) => *other = queued,
            }
        }
        Ok(resource)
    }

    fn name(&self) -> &str {
        "extend"
    }
}
