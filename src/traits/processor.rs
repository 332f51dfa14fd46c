// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::engine::ResourceState;
use crate::errors::ProcessorError;

/// A named transformation step.
///
/// A processor receives the per-call [`ResourceState`] (working document,
/// URI, dependency-tracking accessors) plus the options of the reference that
/// invoked it, and returns the next working document. Every read of another
/// resource must go through the state so the engine can record the
/// dependency.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(
        &self,
        state: &mut ResourceState,
        options: &Value,
    ) -> Result<Document, ProcessorError>;

    /// Name the processor is registered under.
    fn name(&self) -> &str;
}

/// Adapts a synchronous closure into a [`Processor`].
pub struct ProcessorFn<F> {
    name: String,
    func: F,
}

impl<F> ProcessorFn<F>
where
    F: Fn(&mut ResourceState, &Value) -> Result<Document, ProcessorError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> Processor for ProcessorFn<F>
where
    F: Fn(&mut ResourceState, &Value) -> Result<Document, ProcessorError> + Send + Sync,
{
    async fn process(
        &self,
        state: &mut ResourceState,
        options: &Value,
    ) -> Result<Document, ProcessorError> {
        (self.func)(state, options)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
