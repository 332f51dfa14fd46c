// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::document::Document;
use crate::engine::ResourceState;
use crate::errors::ProcessorError;
use crate::traits::Processor;

/// A stub processor that returns the working document unchanged
pub struct StubProcessor {
    pub name: String,
}

impl StubProcessor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Processor for StubProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        _options: &Value,
    ) -> Result<Document, ProcessorError> {
        Ok(state.take_resource())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A processor that always fails for testing failure scenarios.
///
/// It scribbles on the working document first, so tests can check that the
/// engine discards partial edits.
pub struct FailingProcessor {
    pub name: String,
}

impl FailingProcessor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Processor for FailingProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        _options: &Value,
    ) -> Result<Document, ProcessorError> {
        state.resource_mut()["scribbled"] = Value::Bool(true);
        Err(anyhow::anyhow!("Simulated processor failure").into())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A processor that panics
pub struct PanickingProcessor {
    pub name: String,
}

impl PanickingProcessor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Processor for PanickingProcessor {
    async fn process(
        &self,
        _state: &mut ResourceState,
        _options: &Value,
    ) -> Result<Document, ProcessorError> {
        panic!("Simulated processor panic")
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Counts invocations and passes the document through.
pub struct CountingProcessor {
    pub name: String,
    pub calls: Arc<AtomicUsize>,
}

impl CountingProcessor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Processor for CountingProcessor {
    async fn process(
        &self,
        state: &mut ResourceState,
        _options: &Value,
    ) -> Result<Document, ProcessorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(state.take_resource())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
