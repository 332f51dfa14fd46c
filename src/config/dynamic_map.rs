// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::DynamicResourceDefinition;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of dynamic resource definitions, keyed by definition name.
///
/// Installs refer to definitions by name; each install instantiates its own
/// state from the definition found here.
#[derive(Clone, Default)]
pub struct DynamicResourceMap(HashMap<String, Arc<dyn DynamicResourceDefinition>>);

impl DynamicResourceMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register a definition under its own name, returning the one it replaced.
    pub fn register(
        &mut self,
        definition: Arc<dyn DynamicResourceDefinition>,
    ) -> Option<Arc<dyn DynamicResourceDefinition>> {
        self.0.insert(definition.name().to_string(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynamicResourceDefinition>> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl std::fmt::Debug for DynamicResourceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.0.keys().collect();
        names.sort();
        f.debug_struct("DynamicResourceMap")
            .field("definition_names", &names)
            .finish()
    }
}
