// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor execution and lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Processor execution lifecycle (start, completion, failure)
//! * Processor resolution against the registry

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Processor execution started.
///
/// # Log Level
/// `trace!` - High-volume detail
///
/// # Example
/// ```
/// use hypermedium::observability::messages::{processor::ProcessorExecutionStarted, StructuredLog};
///
/// let msg = ProcessorExecutionStarted {
///     processor: "embed",
///     uri: "/posts/index.json",
/// };
///
/// let span = msg.span("processor_execution");
/// let _guard = span.enter();
/// msg.log();
/// ```
pub struct ProcessorExecutionStarted<'a> {
    pub processor: &'a str,
    pub uri: &'a str,
}

impl Display for ProcessorExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processor '{}' started on '{}'", self.processor, self.uri)
    }
}

impl StructuredLog for ProcessorExecutionStarted<'_> {
    fn log(&self) {
        tracing::trace!(processor = self.processor, uri = self.uri, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor_execution",
            span_name = name,
            processor = self.processor,
            uri = self.uri,
        )
    }
}

/// Processor execution completed successfully.
///
/// # Log Level
/// `debug!` - Routine operation
pub struct ProcessorExecutionCompleted<'a> {
    pub processor: &'a str,
    pub uri: &'a str,
    pub duration: std::time::Duration,
}

impl Display for ProcessorExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' completed on '{}' in {:?}",
            self.processor, self.uri, self.duration
        )
    }
}

impl StructuredLog for ProcessorExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            uri = self.uri,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor_completed",
            span_name = name,
            processor = self.processor,
            uri = self.uri,
        )
    }
}

/// Processor execution failed. The document passes through the step unchanged.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use hypermedium::errors::ProcessorError;
/// use hypermedium::observability::messages::processor::ProcessorExecutionFailed;
///
/// let error = ProcessorError::UnknownProcessor { name: "typo".to_string() };
/// let msg = ProcessorExecutionFailed {
///     uri: "/about.json",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Processing '/about.json' failed: unknown processor 'typo'");
/// ```
pub struct ProcessorExecutionFailed<'a> {
    pub uri: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processing '{}' failed: {}", self.uri, self.error)
    }
}

impl StructuredLog for ProcessorExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(uri = self.uri, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "processor_failed",
            span_name = name,
            uri = self.uri,
            error = %self.error,
        )
    }
}
