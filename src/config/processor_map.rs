// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Processor;
use std::collections::HashMap;
use std::sync::Arc;

/// A type-safe registry mapping processor names to their implementations.
///
/// The `ProcessorMap` is the central registry consulted whenever a
/// [`ProcessorRef`](crate::config::ProcessorRef) is resolved, both for the
/// global pre/post stages and for `_processors` entries inside documents.
/// Implementations are wrapped in `Arc<dyn Processor>` so the engine can
/// hand them to concurrently running cascades without cloning.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hypermedium::config::ProcessorMap;
/// use hypermedium::errors::ProcessorError;
/// use hypermedium::traits::{Processor, ProcessorFn};
///
/// let mut processors = ProcessorMap::new();
/// processors.register(Arc::new(ProcessorFn::new("noop", |state, _options| {
///     Ok::<_, ProcessorError>(state.resource().clone())
/// })));
///
/// assert!(processors.contains_key("noop"));
/// assert!(processors.get("missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ProcessorMap(HashMap<String, Arc<dyn Processor>>);

impl ProcessorMap {
    /// Create a new empty processor map
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register a processor under its own name, replacing any previous
    /// registration. Returns the replaced processor.
    pub fn register(&mut self, processor: Arc<dyn Processor>) -> Option<Arc<dyn Processor>> {
        self.0.insert(processor.name().to_string(), processor)
    }

    /// Register a processor under an explicit name
    pub fn insert(&mut self, name: String, processor: Arc<dyn Processor>) {
        self.0.insert(name, processor);
    }

    /// Get a processor by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Processor>> {
        self.0.get(name)
    }

    /// Check if a processor exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Get all registered names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ProcessorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_struct("ProcessorMap")
            .field("processor_count", &self.0.len())
            .field("processor_names", &names)
            .finish()
    }
}

impl From<HashMap<String, Arc<dyn Processor>>> for ProcessorMap {
    fn from(map: HashMap<String, Arc<dyn Processor>>) -> Self {
        Self(map)
    }
}
