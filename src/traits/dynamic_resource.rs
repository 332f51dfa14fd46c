// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin traits for dynamic resources: derived documents kept consistent by
//! observing the load/process/delete lifecycle of the graph.
//!
//! A [`DynamicResourceDefinition`] is registered once under a name. Each
//! install of it produces a fresh [`DynamicResource`] via `instantiate`; that
//! value *is* the instance's private state and lives as long as the engine.
//!
//! Every callback has a no-op default, so an implementation only overrides
//! the events it cares about. Node callbacks fire before resource callbacks
//! and also fire for file nodes; resource callbacks only fire for documents.

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::engine::DynamicResourceApi;
use crate::errors::DynamicResourceError;
use crate::graph::Node;

pub trait DynamicResourceDefinition: Send + Sync {
    /// Name the definition is registered under.
    fn name(&self) -> &str;

    /// Create the state of a new instance from its install options.
    fn instantiate(&self, options: &Value) -> Result<Box<dyn DynamicResource>, DynamicResourceError>;
}

#[async_trait]
#[allow(unused_variables)]
pub trait DynamicResource: Send {
    /// Runs once when the instance is installed.
    async fn init(&mut self, api: &DynamicResourceApi) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_resource_add(
        &mut self,
        uri: &str,
        resource: &Document,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_resource_process(
        &mut self,
        uri: &str,
        resource: &Document,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_resource_delete(
        &mut self,
        uri: &str,
        resource: &Document,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_node_add(
        &mut self,
        uri: &str,
        node: &Node,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_node_process(
        &mut self,
        uri: &str,
        node: &Node,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_node_delete(
        &mut self,
        uri: &str,
        node: &Node,
        api: &DynamicResourceApi,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether the instance is notified about nodes it created itself.
    fn observe_own_writes(&self) -> bool {
        true
    }
}
