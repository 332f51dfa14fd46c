// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the resource graph lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Loading and unloading resources and files
//! * Processing start and completion
//! * Dependency discovery and cycle detection

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// A resource document was loaded into the graph.
///
/// # Log Level
/// `debug!` - Routine operation
///
/// # Example
/// ```
/// use hypermedium::observability::messages::engine::ResourceLoaded;
///
/// let msg = ResourceLoaded {
///     uri: "/posts/hello.json",
///     dynamic_owner: None,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ResourceLoaded<'a> {
    pub uri: &'a str,
    pub dynamic_owner: Option<&'a str>,
}

impl Display for ResourceLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.dynamic_owner {
            Some(owner) => write!(f, "Loaded resource '{}' (owned by '{}')", self.uri, owner),
            None => write!(f, "Loaded resource '{}'", self.uri),
        }
    }
}

impl StructuredLog for ResourceLoaded<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, dynamic_owner = ?self.dynamic_owner, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("load_resource", span_name = name, uri = self.uri)
    }
}

/// A file node was loaded into the graph.
///
/// # Log Level
/// `debug!` - Routine operation
pub struct FileLoaded<'a> {
    pub uri: &'a str,
    pub path: &'a Path,
}

impl Display for FileLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded file '{}' from {}", self.uri, self.path.display())
    }
}

impl StructuredLog for FileLoaded<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("load_file", span_name = name, uri = self.uri)
    }
}

/// A node was removed from the graph.
///
/// # Log Level
/// `debug!` - Routine operation
pub struct ResourceUnloaded<'a> {
    pub uri: &'a str,
    pub existed: bool,
}

impl Display for ResourceUnloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.existed {
            write!(f, "Unloaded '{}'", self.uri)
        } else {
            write!(f, "Unload of '{}' ignored: not loaded", self.uri)
        }
    }
}

impl StructuredLog for ResourceUnloaded<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, existed = self.existed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("unload_resource", span_name = name, uri = self.uri)
    }
}

/// A load replaced a node that already held a value.
///
/// # Log Level
/// `warn!` - Potential issue
pub struct ResourceOverwritten<'a> {
    pub uri: &'a str,
}

impl Display for ResourceOverwritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Overwriting existing node '{}'", self.uri)
    }
}

impl StructuredLog for ResourceOverwritten<'_> {
    fn log(&self) {
        tracing::warn!(uri = self.uri, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("resource_overwritten", span_name = name, uri = self.uri)
    }
}

/// Processing was requested for a URI with no node.
///
/// # Log Level
/// `warn!` - Dangling dependency or stale request; tolerated
pub struct ResourceNotFound<'a> {
    pub uri: &'a str,
}

impl Display for ResourceNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cannot process '{}': resource not found", self.uri)
    }
}

impl StructuredLog for ResourceNotFound<'_> {
    fn log(&self) {
        tracing::warn!(uri = self.uri, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("resource_not_found", span_name = name, uri = self.uri)
    }
}

/// A resource was unloaded while its processors were still running, so the
/// result was discarded.
///
/// # Log Level
/// `warn!` - Concurrent unload; the result is dropped
pub struct ResourceUnloadedDuringProcessing<'a> {
    pub uri: &'a str,
}

impl Display for ResourceUnloadedDuringProcessing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resource '{}' was unloaded while processing", self.uri)
    }
}

impl StructuredLog for ResourceUnloadedDuringProcessing<'_> {
    fn log(&self) {
        tracing::warn!(uri = self.uri, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("resource_unloaded_during_processing", span_name = name, uri = self.uri)
    }
}

/// Processing of a resource started.
///
/// # Log Level
/// `debug!` - Routine operation
///
/// # Example
/// ```
/// use hypermedium::observability::messages::{engine::ProcessingStarted, StructuredLog};
///
/// let msg = ProcessingStarted { uri: "/index.json", depth: 0 };
/// let span = msg.span("process_resource");
/// let _guard = span.enter();
/// msg.log();
/// ```
pub struct ProcessingStarted<'a> {
    pub uri: &'a str,
    /// Length of the cascade path that led here.
    pub depth: usize,
}

impl Display for ProcessingStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processing '{}' (cascade depth {})", self.uri, self.depth)
    }
}

impl StructuredLog for ProcessingStarted<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, depth = self.depth, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_resource",
            span_name = name,
            uri = self.uri,
            depth = self.depth,
        )
    }
}

/// Processing of a resource completed and its output was stored.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessingCompleted<'a> {
    pub uri: &'a str,
    pub duration: Duration,
    pub edge_count: usize,
    pub processor_count: usize,
}

impl Display for ProcessingCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed '{}' in {:?}: {} processors, {} dependencies",
            self.uri, self.duration, self.processor_count, self.edge_count
        )
    }
}

impl StructuredLog for ProcessingCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            uri = self.uri,
            duration_ms = self.duration.as_millis() as u64,
            edge_count = self.edge_count,
            processor_count = self.processor_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processing_completed",
            span_name = name,
            uri = self.uri,
            duration = ?self.duration,
        )
    }
}

/// A cascade reached a resource already on its path.
///
/// # Log Level
/// `warn!` - The cascade is truncated at the repeated node
///
/// # Example
/// ```
/// use hypermedium::observability::messages::engine::DependencyCycleDetected;
///
/// let path = vec!["/a.json".to_string(), "/b.json".to_string(), "/a.json".to_string()];
/// let msg = DependencyCycleDetected { path: &path };
///
/// assert_eq!(msg.to_string(), "Dependency cycle detected: /a.json -> /b.json -> /a.json");
/// ```
pub struct DependencyCycleDetected<'a> {
    pub path: &'a [String],
}

impl Display for DependencyCycleDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dependency cycle detected: {}", self.path.join(" -> "))
    }
}

impl StructuredLog for DependencyCycleDetected<'_> {
    fn log(&self) {
        tracing::warn!(
            cycle = %self.path.join(" -> "),
            cycle_length = self.path.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "dependency_cycle",
            span_name = name,
            cycle = %self.path.join(" -> "),
        )
    }
}

/// A processor run recorded a new dependency attribution.
///
/// # Log Level
/// `trace!` - High-volume detail
pub struct DependencyAdded<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub processor: &'a str,
}

impl Display for DependencyAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' now depends on '{}' via processor '{}'",
            self.source, self.target, self.processor
        )
    }
}

impl StructuredLog for DependencyAdded<'_> {
    fn log(&self) {
        tracing::trace!(
            source = self.source,
            target = self.target,
            processor = self.processor,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "add_dependency",
            span_name = name,
            source = self.source,
            target = self.target,
        )
    }
}
