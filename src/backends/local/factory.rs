// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::dynamic_resources::IndexDefinition;
use super::processors::*;
use crate::config::{DynamicResourceMap, ProcessorMap};
use crate::traits::{DynamicResourceDefinition, Processor};

/// Factory for the built-in (in-process) processors and dynamic resources
pub struct LocalProcessorFactory;

impl LocalProcessorFactory {
    /// Create a built-in processor by name
    ///
    /// - "self" -> SelfLinkProcessor
    /// - "extend" -> ExtendProcessor
    /// - "copy" -> CopyProcessor
    /// - "embed" -> EmbedProcessor
    pub fn create_processor(name: &str) -> Result<Arc<dyn Processor>, String> {
        match name {
            "self" => Ok(Arc::new(SelfLinkProcessor::new())),
            "extend" => Ok(Arc::new(ExtendProcessor::new())),
            "copy" => Ok(Arc::new(CopyProcessor::new())),
            "embed" => Ok(Arc::new(EmbedProcessor::new())),
            _ => Err(format!("Unknown local processor implementation: '{}'", name)),
        }
    }

    /// Create a built-in dynamic resource definition by name
    pub fn create_dynamic_resource(name: &str) -> Result<Arc<dyn DynamicResourceDefinition>, String> {
        match name {
            "index" => Ok(Arc::new(IndexDefinition)),
            _ => Err(format!("Unknown local dynamic resource: '{}'", name)),
        }
    }

    /// List all available local processor implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["self", "extend", "copy", "embed"]
    }

    pub fn list_available_dynamic_resources() -> Vec<&'static str> {
        vec!["index"]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(name: &str) -> bool {
        Self::list_available_implementations().contains(&name)
    }

    /// Register every built-in into the given registries.
    pub fn register_all(processors: &mut ProcessorMap, dynamic_resources: &mut DynamicResourceMap) {
        for name in Self::list_available_implementations() {
            if let Ok(processor) = Self::create_processor(name) {
                processors.register(processor);
            }
        }
        for name in Self::list_available_dynamic_resources() {
            if let Ok(definition) = Self::create_dynamic_resource(name) {
                dynamic_resources.register(definition);
            }
        }
    }
}
