// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The processing pipeline: pre-processors, the document's own
//! `_processors` worklist, post-processors, then the cascade to dependents.
//!
//! # Local worklist
//!
//! `_processors` is read from the working document before every step, not
//! snapshotted: the first entry is popped (the key is dropped once the array
//! is empty) and the popped processor's output becomes the next working
//! document. A processor can therefore queue further processors for the same
//! run by returning a document with new `_processors` entries.
//!
//! # Cycles
//!
//! Every recursive call carries the chain of URIs that led to it. A URI that
//! is already on the chain is a cycle: the call publishes a warning naming
//! the cycle and returns an empty document for that URI without processing.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use crate::config::ProcessorRef;
use crate::document::{empty_document, Document, PROCESSORS_PROPERTY};
use crate::engine::dynamic::LifecycleEvent;
use crate::engine::{Event, HypermediaEngine, ProcessedResource, ResourceState};
use crate::errors::ProcessorError;
use crate::graph::Node;
use crate::observability::messages::engine::{
    DependencyCycleDetected, ProcessingCompleted, ProcessingStarted, ResourceNotFound,
    ResourceUnloadedDuringProcessing,
};
use crate::observability::messages::processor::{
    ProcessorExecutionCompleted, ProcessorExecutionFailed, ProcessorExecutionStarted,
};
use crate::observability::messages::StructuredLog;

impl HypermediaEngine {
    /// Process a resource and cascade to everything that depends on it.
    ///
    /// Returns the resource itself first, then every resource reprocessed by
    /// the cascade. File nodes are not transformed and contribute only their
    /// cascade. A missing node yields an empty result.
    pub async fn process_resource(&self, uri: &str) -> Vec<ProcessedResource> {
        let uri = self.normalize(uri);
        self.process_with_path(uri, Vec::new()).await
    }

    pub(crate) fn process_with_path(
        &self,
        uri: String,
        path: Vec<String>,
    ) -> BoxFuture<'static, Vec<ProcessedResource>> {
        let engine = self.clone();
        Box::pin(async move {
            if let Some(start) = path.iter().position(|seen| *seen == uri) {
                let mut cycle = path[start..].to_vec();
                cycle.push(uri.clone());
                let msg = DependencyCycleDetected { path: &cycle };
                msg.log();
                engine.emit(Event::Warning {
                    message: msg.to_string(),
                });
                return vec![ProcessedResource {
                    uri,
                    resource: empty_document(),
                }];
            }

            let node = engine.inner.graph.read().node(&uri).cloned();
            match node {
                None => {
                    let msg = ResourceNotFound { uri: &uri };
                    msg.log();
                    engine.emit(Event::Warning {
                        message: msg.to_string(),
                    });
                    Vec::new()
                }
                Some(node @ Node::File(_)) => {
                    engine.notify(LifecycleEvent::Process, &uri, &node);
                    engine.cascade(&uri, path).await
                }
                Some(Node::Resource(resource)) => {
                    let Some(processed) =
                        engine.run_pipeline(&uri, resource.original, path.len()).await
                    else {
                        return Vec::new();
                    };
                    let mut results = vec![processed];
                    results.extend(engine.cascade(&uri, path).await);
                    results
                }
            }
        })
    }

    /// Run all three stages for one resource and store the result.
    ///
    /// Returns `None` if the node disappeared while its processors ran.
    async fn run_pipeline(
        &self,
        uri: &str,
        original: Document,
        depth: usize,
    ) -> Option<ProcessedResource> {
        let started = ProcessingStarted { uri, depth };
        started.log();
        let span = started.span("process_resource");

        async {
            let start = Instant::now();
            self.inner.graph.write().reset_dependencies(uri);
            self.emit(Event::ProcessResourceStart {
                uri: uri.to_string(),
            });

            let config = &self.inner.config;
            let mut ran = Vec::new();
            let mut resource = original;

            for reference in &config.pre_processors {
                resource = self.execute_processor(reference, uri, resource).await;
                ran.push(reference.name.clone());
            }

            while let Some(entry) = pop_local_processor(&mut resource) {
                match ProcessorRef::from_value(&entry) {
                    Ok(reference) => {
                        resource = self.execute_processor(&reference, uri, resource).await;
                        ran.push(reference.name);
                    }
                    Err(error) => self.report_processor_error(uri, &error),
                }
            }

            for reference in &config.post_processors {
                resource = self.execute_processor(reference, uri, resource).await;
                ran.push(reference.name.clone());
            }

            let (stored, edges, node) = {
                let mut graph = self.inner.graph.write();
                let stored = graph.set_processed(uri, resource.clone());
                (stored, graph.dependencies(uri), graph.node(uri).cloned())
            };
            let Some(node) = node.filter(|_| stored) else {
                let msg = ResourceUnloadedDuringProcessing { uri };
                msg.log();
                self.emit(Event::Warning {
                    message: msg.to_string(),
                });
                return None;
            };

            let duration = start.elapsed();
            ProcessingCompleted {
                uri,
                duration,
                edge_count: edges.len(),
                processor_count: ran.len(),
            }
            .log();
            self.emit(Event::ProcessResource {
                uri: uri.to_string(),
                duration,
                edges,
                resource: resource.clone(),
                processors: ran,
            });
            self.notify(LifecycleEvent::Process, uri, &node);

            Some(ProcessedResource {
                uri: uri.to_string(),
                resource,
            })
        }
        .instrument(span)
        .await
    }

    /// Reprocess every dependent of `uri`, extending the cycle path.
    async fn cascade(&self, uri: &str, mut path: Vec<String>) -> Vec<ProcessedResource> {
        let dependents = self.inner.graph.read().dependents(uri);
        if dependents.is_empty() {
            return Vec::new();
        }
        path.push(uri.to_string());

        let runs = dependents
            .into_iter()
            .map(|dependent| self.process_with_path(dependent, path.clone()));
        join_all(runs).await.into_iter().flatten().collect()
    }

    /// Run one processor reference on `resource`.
    ///
    /// Unknown processors, errors and panics are reported and yield the
    /// input document unchanged.
    pub(crate) fn execute_processor<'a>(
        &'a self,
        reference: &'a ProcessorRef,
        uri: &'a str,
        resource: Document,
    ) -> BoxFuture<'a, Document> {
        Box::pin(async move {
            let processor = self.inner.processors.read().get(&reference.name).cloned();
            let Some(processor) = processor else {
                self.report_processor_error(
                    uri,
                    &ProcessorError::UnknownProcessor {
                        name: reference.name.clone(),
                    },
                );
                return resource;
            };

            let started = ProcessorExecutionStarted {
                processor: &reference.name,
                uri,
            };
            started.log();
            let span = started.span("execute_processor");

            let start = Instant::now();
            let mut state =
                ResourceState::new(self.clone(), uri, &reference.name, resource.clone());
            let outcome = AssertUnwindSafe(processor.process(&mut state, &reference.options))
                .catch_unwind()
                .instrument(span)
                .await;

            match outcome {
                Ok(Ok(next)) => {
                    ProcessorExecutionCompleted {
                        processor: &reference.name,
                        uri,
                        duration: start.elapsed(),
                    }
                    .log();
                    next
                }
                Ok(Err(error)) => {
                    self.report_processor_error(uri, &error.in_context(&reference.name, uri));
                    resource
                }
                Err(panic) => {
                    let error = ProcessorError::Panicked {
                        processor: reference.name.clone(),
                        uri: uri.to_string(),
                        message: panic_message(panic.as_ref()),
                    };
                    self.report_processor_error(uri, &error);
                    resource
                }
            }
        })
    }

    /// Run processor references in order, threading the document through.
    pub(crate) async fn execute_processors(
        &self,
        references: &[ProcessorRef],
        uri: &str,
        mut resource: Document,
    ) -> Document {
        for reference in references {
            resource = self.execute_processor(reference, uri, resource).await;
        }
        resource
    }

    fn report_processor_error(&self, uri: &str, error: &ProcessorError) {
        ProcessorExecutionFailed { uri, error }.log();
        self.emit(Event::ProcessorError {
            uri: uri.to_string(),
            error: error.to_string(),
        });
    }
}

/// Pop the next `_processors` entry, dropping the key once it is exhausted.
///
/// A non-array value is taken as a single entry.
fn pop_local_processor(resource: &mut Document) -> Option<Value> {
    let Value::Object(map) = resource else {
        return None;
    };
    match map.get_mut(PROCESSORS_PROPERTY)? {
        Value::Array(entries) if !entries.is_empty() => {
            let entry = entries.remove(0);
            if entries.is_empty() {
                map.remove(PROCESSORS_PROPERTY);
            }
            Some(entry)
        }
        Value::Array(_) => {
            map.remove(PROCESSORS_PROPERTY);
            None
        }
        _ => map.remove(PROCESSORS_PROPERTY),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
