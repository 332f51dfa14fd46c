// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dynamic resource instances.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A dynamic resource instance was installed and initialized.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DynamicResourceInstalled<'a> {
    pub instance: &'a str,
    pub definition: &'a str,
    pub base_uri: &'a str,
}

impl Display for DynamicResourceInstalled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Installed dynamic resource '{}' ({}) at {}",
            self.instance, self.definition, self.base_uri
        )
    }
}

impl StructuredLog for DynamicResourceInstalled<'_> {
    fn log(&self) {
        tracing::info!(
            instance = self.instance,
            definition = self.definition,
            base_uri = self.base_uri,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dynamic_resource_install",
            span_name = name,
            instance = self.instance,
        )
    }
}

/// A dynamic resource instance published a document.
///
/// # Log Level
/// `debug!` - Routine operation
pub struct DynamicResourcePublished<'a> {
    pub instance: &'a str,
    pub uri: &'a str,
    pub updated: bool,
}

impl Display for DynamicResourcePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let verb = if self.updated { "updated" } else { "created" };
        write!(f, "Dynamic resource '{}' {} '{}'", self.instance, verb, self.uri)
    }
}

impl StructuredLog for DynamicResourcePublished<'_> {
    fn log(&self) {
        tracing::debug!(
            instance = self.instance,
            uri = self.uri,
            updated = self.updated,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dynamic_resource_publish",
            span_name = name,
            instance = self.instance,
            uri = self.uri,
        )
    }
}

/// A dynamic resource callback failed or panicked.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use hypermedium::observability::messages::dynamic::DynamicResourceCallbackFailed;
///
/// let error = anyhow::anyhow!("index corrupted");
/// let msg = DynamicResourceCallbackFailed {
///     instance: "tags",
///     uri: Some("/posts/a.json"),
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Dynamic resource 'tags' failed on '/posts/a.json': index corrupted");
/// ```
pub struct DynamicResourceCallbackFailed<'a> {
    pub instance: &'a str,
    pub uri: Option<&'a str>,
    pub error: &'a dyn Display,
}

impl Display for DynamicResourceCallbackFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.uri {
            Some(uri) => write!(
                f,
                "Dynamic resource '{}' failed on '{}': {}",
                self.instance, uri, self.error
            ),
            None => write!(f, "Dynamic resource '{}' failed: {}", self.instance, self.error),
        }
    }
}

impl StructuredLog for DynamicResourceCallbackFailed<'_> {
    fn log(&self) {
        tracing::error!(
            instance = self.instance,
            uri = ?self.uri,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "dynamic_resource_failed",
            span_name = name,
            instance = self.instance,
        )
    }
}
