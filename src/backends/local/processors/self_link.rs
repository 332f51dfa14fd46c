// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Document, PropertyPath};
use crate::engine::ResourceState;
use crate::errors::ProcessorError;
use crate::traits::Processor;

/// Sets `_links.self.href` to the URI of the resource being processed.
pub struct SelfLinkProcessor;

impl SelfLinkProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SelfLinkProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for SelfLinkProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        _options: &Value,
    ) -> Result<Document, ProcessorError> {
        let href = Value::String(state.uri().to_string());
        let mut resource = state.take_resource();
        PropertyPath::from_segments(["_links", "self", "href"])?.set(&mut resource, href)?;
        Ok(resource)
    }

    fn name(&self) -> &str {
        "self"
    }
}
