// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::config::ProcessorRef;
use crate::document::Document;
use crate::engine::{Event, HypermediaEngine};

/// Per-call state handed to a processor.
///
/// Holds the working document and the URI being processed. Reads of other
/// resources through [`ResourceState::get_resource`] and
/// [`ResourceState::get_file`] always record a dependency edge attributed to
/// the running processor, whether or not the target exists yet, so the
/// resource is reprocessed once the target appears or changes.
pub struct ResourceState {
    engine: HypermediaEngine,
    uri: String,
    processor: String,
    resource: Document,
}

impl ResourceState {
    pub(crate) fn new(
        engine: HypermediaEngine,
        uri: &str,
        processor: &str,
        resource: Document,
    ) -> Self {
        Self {
            engine,
            uri: uri.to_string(),
            processor: processor.to_string(),
            resource,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Name of the processor this state was built for.
    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn resource(&self) -> &Document {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut Document {
        &mut self.resource
    }

    /// Move the working document out, leaving `null` behind.
    pub fn take_resource(&mut self) -> Document {
        std::mem::take(&mut self.resource)
    }

    pub fn engine(&self) -> &HypermediaEngine {
        &self.engine
    }

    /// Current value of another resource, recording `uri -> dep`.
    pub fn get_resource(&self, dep: &str) -> Option<Document> {
        let dep = self.engine.normalize(dep);
        self.engine.add_dependency(&self.uri, &dep, &self.processor);
        self.engine.inner.graph.read().get_resource(&dep).cloned()
    }

    /// Path of a file node, recording `uri -> dep`.
    pub fn get_file(&self, dep: &str) -> Option<PathBuf> {
        let dep = self.engine.normalize(dep);
        self.engine.add_dependency(&self.uri, &dep, &self.processor);
        self.engine
            .inner
            .graph
            .read()
            .get_file(&dep)
            .map(|file| file.path.clone())
    }

    /// Run another processor on `resource` (the working document if `None`)
    /// and return its output. Dependencies it records are attributed to the
    /// invoked processor. Failures are reported and yield the input unchanged.
    pub async fn exec_processor(
        &self,
        reference: &ProcessorRef,
        resource: Option<Document>,
    ) -> Document {
        let input = resource.unwrap_or_else(|| self.resource.clone());
        self.engine
            .execute_processor(reference, &self.uri, input)
            .await
    }

    /// Run a list of processors in sequence, threading the document through.
    pub async fn exec_processors(
        &self,
        references: &[ProcessorRef],
        resource: Option<Document>,
    ) -> Document {
        let input = resource.unwrap_or_else(|| self.resource.clone());
        self.engine
            .execute_processors(references, &self.uri, input)
            .await
    }

    pub fn logger(&self) -> ScopedLogger {
        ScopedLogger::new(self.engine.clone(), &self.processor, Some(&self.uri))
    }
}

/// Logger tagged with the processor or dynamic resource it belongs to.
///
/// `warn` and `error` also publish a `Warning` event.
#[derive(Clone)]
pub struct ScopedLogger {
    engine: HypermediaEngine,
    scope: String,
    uri: Option<String>,
}

impl ScopedLogger {
    pub(crate) fn new(engine: HypermediaEngine, scope: &str, uri: Option<&str>) -> Self {
        Self {
            engine,
            scope: scope.to_string(),
            uri: uri.map(str::to_string),
        }
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(scope = %self.scope, uri = ?self.uri, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(scope = %self.scope, uri = ?self.uri, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(scope = %self.scope, uri = ?self.uri, "{}", message);
        self.publish(message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(scope = %self.scope, uri = ?self.uri, "{}", message);
        self.publish(message);
    }

    fn publish(&self, message: &str) {
        let message = match &self.uri {
            Some(uri) => format!("[{}] {}: {}", self.scope, uri, message),
            None => format!("[{}] {}", self.scope, message),
        };
        self.engine.emit(Event::Warning { message });
    }
}
