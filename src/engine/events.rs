// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::document::Document;
use crate::graph::DependencyEdge;

/// Events published on the engine's stream.
///
/// This is the sole programmatic observability channel: nothing on the
/// load/process/unload paths returns an error, failures only show up here
/// (and in the logs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    LoadResource {
        uri: String,
        dynamic_owner: Option<String>,
    },
    LoadFile {
        uri: String,
        path: PathBuf,
    },
    UnloadResource {
        uri: String,
    },
    ProcessResourceStart {
        uri: String,
    },
    ProcessResource {
        uri: String,
        duration: Duration,
        edges: Vec<DependencyEdge>,
        resource: Document,
        processors: Vec<String>,
    },
    AddDependency {
        v: String,
        w: String,
        processor: String,
    },
    ProcessorError {
        uri: String,
        error: String,
    },
    DynamicResourceError {
        dynamic_resource: String,
        uri: Option<String>,
        error: String,
    },
    Warning {
        message: String,
    },
}

impl Event {
    /// The URI the event is about, if any.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Event::LoadResource { uri, .. }
            | Event::LoadFile { uri, .. }
            | Event::UnloadResource { uri }
            | Event::ProcessResourceStart { uri }
            | Event::ProcessResource { uri, .. }
            | Event::ProcessorError { uri, .. } => Some(uri),
            Event::AddDependency { v, .. } => Some(v),
            Event::DynamicResourceError { uri, .. } => uri.as_deref(),
            Event::Warning { .. } => None,
        }
    }
}

/// One entry of a `process_resource` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedResource {
    pub uri: String,
    pub resource: Document,
}
