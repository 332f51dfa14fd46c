// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The hypermedia engine: owner of the resource graph, the registries and
//! the installed dynamic resources.
//!
//! `HypermediaEngine` is a cheap, cloneable handle. All graph mutation
//! happens inside it under short, synchronous locks that are never held
//! across an await point; processors and dynamic resources only reach the
//! graph through [`ResourceState`](crate::engine::ResourceState) and
//! [`DynamicResourceApi`](crate::engine::DynamicResourceApi).
//!
//! # Lifecycle
//!
//! ```text
//! load_resource / load_file ──> graph node ──> process_resource(uri)
//!        │                                         │
//!        └─ on_add notifications                   ├─ pre → _processors → post
//!                                                  ├─ store, on_process notifications
//!                                                  └─ cascade to dependents
//! ```
//!
//! Notifications to dynamic resources are queued per instance and handled
//! in the background; the triggering call does not wait for them. Use
//! [`HypermediaEngine::settle`] to wait until every queued notification (and
//! everything it triggered) has been handled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

use crate::config::{DynamicResourceInstall, DynamicResourceMap, EngineConfig, ProcessorMap};
use crate::document::Document;
use crate::engine::dynamic::{spawn_instance, InstalledDynamicResource, LifecycleEvent};
use crate::engine::Event;
use crate::errors::DynamicResourceError;
use crate::graph::{DependencyEdge, FileNode, Node, ResourceGraph, ResourceNode, UriNormalizer};
use crate::observability::messages::engine::{
    DependencyAdded, FileLoaded, ResourceLoaded, ResourceOverwritten, ResourceUnloaded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DynamicResourceDefinition, Processor};

#[derive(Clone)]
pub struct HypermediaEngine {
    pub(crate) inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) normalizer: UriNormalizer,
    pub(crate) graph: RwLock<ResourceGraph>,
    pub(crate) processors: RwLock<ProcessorMap>,
    pub(crate) definitions: RwLock<DynamicResourceMap>,
    pub(crate) instances: RwLock<Vec<InstalledDynamicResource>>,
    pub(crate) events: broadcast::Sender<Event>,
    pub(crate) notifications: TaskTracker,
}

impl HypermediaEngine {
    /// Create an engine. Dynamic resources listed in `config` are not
    /// installed here; see [`RuntimeBuilder`](crate::config::RuntimeBuilder)
    /// or [`HypermediaEngine::install_dynamic_resource`].
    pub fn new(
        config: EngineConfig,
        processors: ProcessorMap,
        definitions: DynamicResourceMap,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let normalizer = config.uri_normalizer();
        Self {
            inner: Arc::new(EngineInner {
                config,
                normalizer,
                graph: RwLock::new(ResourceGraph::new()),
                processors: RwLock::new(processors),
                definitions: RwLock::new(definitions),
                instances: RwLock::new(Vec::new()),
                events,
                notifications: TaskTracker::new(),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Normalize a URI the way every engine boundary does.
    pub fn normalize(&self, uri: &str) -> String {
        self.inner.normalizer.normalize(uri)
    }

    /// Subscribe to the event stream. Only events published after this call
    /// are received.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub fn register_processor(&self, processor: Arc<dyn Processor>) {
        self.inner.processors.write().register(processor);
    }

    pub fn register_dynamic_resource(&self, definition: Arc<dyn DynamicResourceDefinition>) {
        self.inner.definitions.write().register(definition);
    }

    /// Current value of a resource: processed if available, else original.
    ///
    /// This is a plain read; it records no dependency.
    pub fn get_resource(&self, uri: &str) -> Option<Document> {
        let uri = self.normalize(uri);
        self.inner.graph.read().get_resource(&uri).cloned()
    }

    /// Path of a file node. Records no dependency.
    pub fn get_file(&self, uri: &str) -> Option<PathBuf> {
        let uri = self.normalize(uri);
        self.inner.graph.read().get_file(&uri).map(|file| file.path.clone())
    }

    /// Snapshot of a node.
    pub fn node(&self, uri: &str) -> Option<Node> {
        let uri = self.normalize(uri);
        self.inner.graph.read().node(&uri).cloned()
    }

    pub fn contains(&self, uri: &str) -> bool {
        let uri = self.normalize(uri);
        self.inner.graph.read().contains(&uri)
    }

    /// All node URIs, sorted.
    pub fn uris(&self) -> Vec<String> {
        self.inner.graph.read().uris()
    }

    /// Outgoing dependency edges of `uri`, as recorded by its last run.
    pub fn dependencies_of(&self, uri: &str) -> Vec<DependencyEdge> {
        let uri = self.normalize(uri);
        self.inner.graph.read().dependencies(&uri)
    }

    /// Resources whose last run consulted `uri`.
    pub fn dependents_of(&self, uri: &str) -> Vec<String> {
        let uri = self.normalize(uri);
        self.inner.graph.read().dependents(&uri)
    }

    /// Load (or reload) a resource document.
    ///
    /// Any previous processed value is discarded, so the resource must be
    /// processed again before consumers see derived data. Does not process.
    pub fn load_resource(&self, uri: &str, resource: Document) {
        let uri = self.normalize(uri);
        self.load_normalized(&uri, resource, None);
    }

    pub(crate) fn load_normalized(&self, uri: &str, resource: Document, owner: Option<String>) {
        let node = Node::Resource(ResourceNode::new(resource, owner.clone()));

        let previous = self.inner.graph.write().add_node(uri, node.clone());
        if let Some(previous) = previous {
            let republish = owner.is_some() && previous.dynamic_owner() == owner.as_deref();
            if !republish {
                let msg = ResourceOverwritten { uri };
                msg.log();
                self.emit(Event::Warning {
                    message: msg.to_string(),
                });
            }
        }

        ResourceLoaded {
            uri,
            dynamic_owner: owner.as_deref(),
        }
        .log();
        self.emit(Event::LoadResource {
            uri: uri.to_string(),
            dynamic_owner: owner,
        });
        self.notify(LifecycleEvent::Add, uri, &node);
    }

    /// Load (or reload) a file node. Does not process or cascade.
    pub fn load_file(&self, uri: &str, path: impl AsRef<Path>) {
        let uri = self.normalize(uri);
        let path = path.as_ref().to_path_buf();
        let node = Node::File(FileNode { path: path.clone() });

        let previous = self.inner.graph.write().add_node(&uri, node.clone());
        if previous.is_some() {
            let msg = ResourceOverwritten { uri: &uri };
            msg.log();
            self.emit(Event::Warning {
                message: msg.to_string(),
            });
        }

        FileLoaded { uri: &uri, path: &path }.log();
        self.emit(Event::LoadFile {
            uri: uri.clone(),
            path,
        });
        self.notify(LifecycleEvent::Add, &uri, &node);
    }

    /// Remove a node. Dependents keep their edges to it, so they are
    /// reprocessed if it is loaded and processed again.
    pub fn unload_resource(&self, uri: &str) -> Option<Node> {
        let uri = self.normalize(uri);
        let removed = self.inner.graph.write().remove_node(&uri);

        ResourceUnloaded {
            uri: &uri,
            existed: removed.is_some(),
        }
        .log();

        let node = removed?;
        for installed in self.inner.instances.read().iter() {
            installed.instance.forget(&uri);
        }
        self.emit(Event::UnloadResource { uri: uri.clone() });
        self.notify(LifecycleEvent::Delete, &uri, &node);
        Some(node)
    }

    /// Record a dependency edge, publishing an event if the attribution is new.
    pub(crate) fn add_dependency(&self, source: &str, target: &str, processor: &str) -> bool {
        let added = self
            .inner
            .graph
            .write()
            .add_dependency(source, target, processor);
        if added {
            DependencyAdded {
                source,
                target,
                processor,
            }
            .log();
            self.emit(Event::AddDependency {
                v: source.to_string(),
                w: target.to_string(),
                processor: processor.to_string(),
            });
        }
        added
    }

    /// Install a dynamic resource instance and run its `init`.
    ///
    /// The instance observes lifecycle events from this point on; nodes
    /// loaded earlier are not replayed.
    pub async fn install_dynamic_resource(
        &self,
        install: DynamicResourceInstall,
    ) -> Result<(), DynamicResourceError> {
        let definition = self
            .inner
            .definitions
            .read()
            .get(&install.name)
            .cloned()
            .ok_or_else(|| DynamicResourceError::UnknownDefinition {
                name: install.name.clone(),
            })?;

        self.ensure_instance_id_free(install.instance_id())?;
        let installed = spawn_instance(self, definition.as_ref(), &install).await?;

        let mut instances = self.inner.instances.write();
        if instances.iter().any(|i| i.instance.id() == installed.instance.id()) {
            return Err(DynamicResourceError::DuplicateInstance {
                id: installed.instance.id().to_string(),
            });
        }
        instances.push(installed);
        Ok(())
    }

    fn ensure_instance_id_free(&self, id: &str) -> Result<(), DynamicResourceError> {
        if self.inner.instances.read().iter().any(|i| i.instance.id() == id) {
            return Err(DynamicResourceError::DuplicateInstance { id: id.to_string() });
        }
        Ok(())
    }

    /// Ids of the installed dynamic resource instances, in install order.
    pub fn dynamic_resource_ids(&self) -> Vec<String> {
        self.inner
            .instances
            .read()
            .iter()
            .map(|i| i.instance.id().to_string())
            .collect()
    }

    /// URIs created by a dynamic resource instance that are still loaded.
    pub fn owned_uris(&self, instance_id: &str) -> Vec<String> {
        self.inner
            .instances
            .read()
            .iter()
            .find(|i| i.instance.id() == instance_id)
            .map(|i| i.instance.owned_uris())
            .unwrap_or_default()
    }

    /// Queue a lifecycle notification for every installed instance.
    pub(crate) fn notify(&self, event: LifecycleEvent, uri: &str, node: &Node) {
        for installed in self.inner.instances.read().iter() {
            installed.enqueue(&self.inner.notifications, event, uri, node);
        }
    }

    /// Wait until every queued dynamic resource notification, and anything
    /// those notifications triggered, has been handled.
    pub async fn settle(&self) {
        let tracker = &self.inner.notifications;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }
}

impl std::fmt::Debug for HypermediaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypermediaEngine")
            .field("nodes", &self.inner.graph.read().len())
            .field("processors", &*self.inner.processors.read())
            .field("dynamic_resources", &self.dynamic_resource_ids())
            .finish()
    }
}
