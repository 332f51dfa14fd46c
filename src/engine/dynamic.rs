// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime side of dynamic resources: installed instances, their
//! notification queues and the API handed to their callbacks.
//!
//! Each installed instance owns one background worker and an unbounded
//! queue. Lifecycle notifications are pushed onto every queue in the order
//! the engine produced them, so a single instance always observes events in
//! order and never runs two of its callbacks at once. Each queued
//! notification holds a [`TaskTrackerToken`] until handled, which is what
//! [`HypermediaEngine::settle`] waits on.
//!
//! Workers hold only a weak reference to the engine; dropping the last
//! engine handle closes the queues and ends the workers.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::task::{task_tracker::TaskTrackerToken, TaskTracker};

use crate::config::DynamicResourceInstall;
use crate::document::Document;
use crate::engine::hypermedia::EngineInner;
use crate::engine::pipeline::panic_message;
use crate::engine::{Event, HypermediaEngine, ScopedLogger};
use crate::errors::DynamicResourceError;
use crate::graph::Node;
use crate::observability::messages::dynamic::{
    DynamicResourceCallbackFailed, DynamicResourceInstalled, DynamicResourcePublished,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DynamicResource, DynamicResourceDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    Add,
    Process,
    Delete,
}

/// Shared, engine-visible part of an installed instance.
pub(crate) struct DynamicResourceInstance {
    id: String,
    definition: String,
    options: Value,
    base_uri: String,
    owned: Mutex<BTreeSet<String>>,
}

impl DynamicResourceInstance {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn owned_uris(&self) -> Vec<String> {
        self.owned.lock().iter().cloned().collect()
    }

    pub(crate) fn forget(&self, uri: &str) {
        self.owned.lock().remove(uri);
    }

    fn claim(&self, uri: &str) {
        self.owned.lock().insert(uri.to_string());
    }
}

pub(crate) struct InstalledDynamicResource {
    pub(crate) instance: Arc<DynamicResourceInstance>,
    queue: mpsc::UnboundedSender<Notification>,
}

impl InstalledDynamicResource {
    pub(crate) fn enqueue(&self, tracker: &TaskTracker, event: LifecycleEvent, uri: &str, node: &Node) {
        let notification = Notification {
            event,
            uri: uri.to_string(),
            node: node.clone(),
            _token: tracker.token(),
        };
        // A closed queue means the worker is gone; nothing left to notify.
        let _ = self.queue.send(notification);
    }
}

struct Notification {
    event: LifecycleEvent,
    uri: String,
    node: Node,
    _token: TaskTrackerToken,
}

/// Instantiate a definition, run its `init` and start its worker.
pub(crate) async fn spawn_instance(
    engine: &HypermediaEngine,
    definition: &dyn DynamicResourceDefinition,
    install: &DynamicResourceInstall,
) -> Result<InstalledDynamicResource, DynamicResourceError> {
    let id = install.instance_id().to_string();
    let mut resource = definition.instantiate(&install.options)?;

    let base_uri = install
        .config
        .as_ref()
        .and_then(|config| config.base_uri.clone())
        .unwrap_or_else(|| {
            format!(
                "{}/{}/",
                engine.config().dynamic_base.trim_end_matches('/'),
                id
            )
        });

    let instance = Arc::new(DynamicResourceInstance {
        id: id.clone(),
        definition: definition.name().to_string(),
        options: install.options.clone(),
        base_uri,
        owned: Mutex::new(BTreeSet::new()),
    });
    let api = DynamicResourceApi {
        engine: engine.clone(),
        instance: Arc::clone(&instance),
    };

    let init = AssertUnwindSafe(resource.init(&api)).catch_unwind().await;
    let failure = match init {
        Ok(Ok(())) => None,
        Ok(Err(error)) => Some(error),
        Err(panic) => Some(anyhow::anyhow!("panicked: {}", panic_message(panic.as_ref()))),
    };
    if let Some(error) = failure {
        report_failure(engine, &instance.id, None, &error);
        return Err(DynamicResourceError::Callback {
            instance: id,
            uri: instance.base_uri.clone(),
            source: error,
        });
    }

    DynamicResourceInstalled {
        instance: &instance.id,
        definition: &instance.definition,
        base_uri: &instance.base_uri,
    }
    .log();

    let (queue, receiver) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(
        resource,
        receiver,
        Arc::downgrade(&engine.inner),
        Arc::clone(&instance),
    ));

    Ok(InstalledDynamicResource { instance, queue })
}

async fn run_worker(
    mut resource: Box<dyn DynamicResource>,
    mut queue: mpsc::UnboundedReceiver<Notification>,
    engine: Weak<EngineInner>,
    instance: Arc<DynamicResourceInstance>,
) {
    while let Some(notification) = queue.recv().await {
        let Some(inner) = engine.upgrade() else {
            break;
        };
        let api = DynamicResourceApi {
            engine: HypermediaEngine { inner },
            instance: Arc::clone(&instance),
        };
        dispatch(resource.as_mut(), &notification, &api).await;
    }
    tracing::debug!(instance = %instance.id, "Dynamic resource worker stopped");
}

/// Deliver one notification: node callback first, then the resource
/// callback for nodes that carry a document. Each callback is isolated.
async fn dispatch(resource: &mut dyn DynamicResource, notification: &Notification, api: &DynamicResourceApi) {
    let Notification { event, uri, node, .. } = notification;

    if !resource.observe_own_writes() && node.dynamic_owner() == Some(api.id()) {
        return;
    }

    let outcome = match event {
        LifecycleEvent::Add => AssertUnwindSafe(resource.on_node_add(uri, node, api)).catch_unwind().await,
        LifecycleEvent::Process => {
            AssertUnwindSafe(resource.on_node_process(uri, node, api)).catch_unwind().await
        }
        LifecycleEvent::Delete => {
            AssertUnwindSafe(resource.on_node_delete(uri, node, api)).catch_unwind().await
        }
    };
    settle_callback(api, uri, outcome);

    let Some(document) = node.document() else {
        return;
    };
    let outcome = match event {
        LifecycleEvent::Add => {
            AssertUnwindSafe(resource.on_resource_add(uri, document, api)).catch_unwind().await
        }
        LifecycleEvent::Process => {
            AssertUnwindSafe(resource.on_resource_process(uri, document, api))
                .catch_unwind()
                .await
        }
        LifecycleEvent::Delete => {
            AssertUnwindSafe(resource.on_resource_delete(uri, document, api))
                .catch_unwind()
                .await
        }
    };
    settle_callback(api, uri, outcome);
}

fn settle_callback(
    api: &DynamicResourceApi,
    uri: &str,
    outcome: Result<anyhow::Result<()>, Box<dyn std::any::Any + Send>>,
) {
    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(error)) => error,
        Err(panic) => anyhow::anyhow!("panicked: {}", panic_message(panic.as_ref())),
    };
    report_failure(&api.engine, api.id(), Some(uri), &error);
}

fn report_failure(engine: &HypermediaEngine, instance: &str, uri: Option<&str>, error: &anyhow::Error) {
    DynamicResourceCallbackFailed {
        instance,
        uri,
        error,
    }
    .log();
    engine.emit(Event::DynamicResourceError {
        dynamic_resource: instance.to_string(),
        uri: uri.map(str::to_string),
        error: format!("{:#}", error),
    });
}

/// Result of [`DynamicResourceApi::create_resource`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedResource {
    pub uri: String,
    pub resource: Document,
    /// Whether a node already existed at `uri`.
    pub updated: bool,
}

/// Handle given to dynamic resource callbacks.
#[derive(Clone)]
pub struct DynamicResourceApi {
    engine: HypermediaEngine,
    instance: Arc<DynamicResourceInstance>,
}

impl DynamicResourceApi {
    /// Instance id.
    pub fn id(&self) -> &str {
        &self.instance.id
    }

    /// Name of the definition this instance was created from.
    pub fn definition(&self) -> &str {
        &self.instance.definition
    }

    pub fn options(&self) -> &Value {
        &self.instance.options
    }

    pub fn base_uri(&self) -> &str {
        &self.instance.base_uri
    }

    pub fn owned_uris(&self) -> Vec<String> {
        self.instance.owned_uris()
    }

    pub fn engine(&self) -> &HypermediaEngine {
        &self.engine
    }

    pub fn logger(&self) -> ScopedLogger {
        ScopedLogger::new(self.engine.clone(), &self.instance.id, None)
    }

    /// Resolve `uri` against the base URI: absolute paths are kept, relative
    /// ones replace the last segment of the base.
    pub fn resolve(&self, uri: &str) -> String {
        if uri.starts_with('/') {
            return uri.to_string();
        }
        let base = &self.instance.base_uri;
        let dir = match base.rfind('/') {
            Some(slash) => &base[..=slash],
            None => "/",
        };
        format!("{}{}", dir, uri.trim_start_matches("./"))
    }

    /// Load `resource` at `uri` as owned by this instance and process it.
    ///
    /// Completes once the resource and its cascade have been processed.
    pub async fn create_resource(&self, uri: &str, resource: Document) -> CreatedResource {
        let uri = self.engine.normalize(&self.resolve(uri));
        let updated = self.engine.contains(&uri);

        self.instance.claim(&uri);
        self.engine
            .load_normalized(&uri, resource, Some(self.instance.id.clone()));
        self.engine.process_with_path(uri.clone(), Vec::new()).await;

        DynamicResourcePublished {
            instance: &self.instance.id,
            uri: &uri,
            updated,
        }
        .log();

        let resource = self.engine.get_resource(&uri).unwrap_or_default();
        CreatedResource {
            uri,
            resource,
            updated,
        }
    }
}

impl std::fmt::Debug for DynamicResourceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicResourceApi")
            .field("id", &self.instance.id)
            .field("definition", &self.instance.definition)
            .field("base_uri", &self.instance.base_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DynamicResourceMap, EngineConfig, ProcessorMap};
    use async_trait::async_trait;
    use serde_json::json;

    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
        observe_own: bool,
    }

    #[async_trait]
    impl DynamicResource for Recorder {
        async fn on_node_add(&mut self, uri: &str, _node: &Node, _api: &DynamicResourceApi) -> anyhow::Result<()> {
            self.seen.lock().push(format!("node_add {}", uri));
            Ok(())
        }

        async fn on_resource_add(
            &mut self,
            uri: &str,
            _resource: &Document,
            api: &DynamicResourceApi,
        ) -> anyhow::Result<()> {
            self.seen.lock().push(format!("resource_add {}", uri));
            if uri == "/trigger.json" {
                api.create_resource("generated", json!({"from": uri})).await;
            }
            Ok(())
        }

        async fn on_node_delete(&mut self, _uri: &str, _node: &Node, _api: &DynamicResourceApi) -> anyhow::Result<()> {
            anyhow::bail!("delete not supported")
        }

        fn observe_own_writes(&self) -> bool {
            self.observe_own
        }
    }

    struct RecorderDefinition {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl DynamicResourceDefinition for RecorderDefinition {
        fn name(&self) -> &str {
            "recorder"
        }

        fn instantiate(&self, options: &Value) -> Result<Box<dyn DynamicResource>, DynamicResourceError> {
            Ok(Box::new(Recorder {
                seen: Arc::clone(&self.seen),
                observe_own: options["observe_own"].as_bool().unwrap_or(true),
            }))
        }
    }

    fn engine_with_recorder() -> (HypermediaEngine, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut definitions = DynamicResourceMap::new();
        definitions.register(Arc::new(RecorderDefinition { seen: Arc::clone(&seen) }));
        let engine = HypermediaEngine::new(EngineConfig::default(), ProcessorMap::new(), definitions);
        (engine, seen)
    }

    #[tokio::test]
    async fn test_notifications_arrive_in_order() {
        let (engine, seen) = engine_with_recorder();
        engine
            .install_dynamic_resource(DynamicResourceInstall::new("recorder", json!({})))
            .await
            .unwrap();

        engine.load_resource("/a", json!({}));
        engine.load_file("/b.png", "b.png");
        engine.settle().await;

        assert_eq!(
            *seen.lock(),
            vec!["node_add /a.json", "resource_add /a.json", "node_add /b.png"]
        );
    }

    #[tokio::test]
    async fn test_create_resource_resolves_against_base_uri() {
        let (engine, seen) = engine_with_recorder();
        engine
            .install_dynamic_resource(DynamicResourceInstall::new("recorder", json!({})).with_id("rec"))
            .await
            .unwrap();

        engine.load_resource("/trigger", json!({}));
        engine.settle().await;

        let uri = "/~hypermedium/dynamic/rec/generated.json";
        assert_eq!(engine.get_resource(uri), Some(json!({"from": "/trigger.json"})));
        assert_eq!(engine.node(uri).unwrap().dynamic_owner(), Some("rec"));
        assert_eq!(engine.owned_uris("rec"), vec![uri]);
        // The instance is notified about its own node.
        assert!(seen.lock().contains(&format!("resource_add {}", uri)));
    }

    #[tokio::test]
    async fn test_configured_base_uri_overrides_default() {
        let (engine, _seen) = engine_with_recorder();
        engine
            .install_dynamic_resource(
                DynamicResourceInstall::new("recorder", json!({}))
                    .with_id("rec")
                    .with_base_uri("/gen/"),
            )
            .await
            .unwrap();

        engine.load_resource("/trigger", json!({}));
        engine.settle().await;

        assert_eq!(engine.get_resource("/gen/generated.json"), Some(json!({"from": "/trigger.json"})));
        assert_eq!(engine.owned_uris("rec"), vec!["/gen/generated.json"]);
        assert!(!engine.contains("/~hypermedium/dynamic/rec/generated.json"));
    }

    #[tokio::test]
    async fn test_observe_own_writes_opt_out() {
        let (engine, seen) = engine_with_recorder();
        engine
            .install_dynamic_resource(
                DynamicResourceInstall::new("recorder", json!({"observe_own": false})).with_id("rec"),
            )
            .await
            .unwrap();

        engine.load_resource("/trigger", json!({}));
        engine.settle().await;

        assert_eq!(*seen.lock(), vec!["node_add /trigger.json", "resource_add /trigger.json"]);
    }

    #[tokio::test]
    async fn test_callback_failure_is_reported() {
        let (engine, _seen) = engine_with_recorder();
        engine
            .install_dynamic_resource(DynamicResourceInstall::new("recorder", json!({})))
            .await
            .unwrap();
        let mut events = engine.subscribe();

        engine.load_resource("/a", json!({}));
        engine.unload_resource("/a");
        engine.settle().await;

        let failures: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|e| match e {
                Event::DynamicResourceError { dynamic_resource, uri, error } => Some((dynamic_resource, uri, error)),
                _ => None,
            })
            .collect();
        assert_eq!(
            failures,
            vec![(
                "recorder".to_string(),
                Some("/a.json".to_string()),
                "delete not supported".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_duplicate_instance_id() {
        let (engine, _seen) = engine_with_recorder();
        let install = DynamicResourceInstall::new("recorder", json!({}));
        engine.install_dynamic_resource(install.clone()).await.unwrap();

        let result = engine.install_dynamic_resource(install).await;
        assert!(matches!(result, Err(DynamicResourceError::DuplicateInstance { id }) if id == "recorder"));
    }

    #[tokio::test]
    async fn test_resolve() {
        let (engine, _seen) = engine_with_recorder();
        let instance = Arc::new(DynamicResourceInstance {
            id: "x".to_string(),
            definition: "recorder".to_string(),
            options: Value::Null,
            base_uri: "/gen/x/".to_string(),
            owned: Mutex::new(BTreeSet::new()),
        });
        let api = DynamicResourceApi { engine, instance };

        assert_eq!(api.resolve("/tags"), "/tags");
        assert_eq!(api.resolve("tags"), "/gen/x/tags");
        assert_eq!(api.resolve("./tags"), "/gen/x/tags");
    }
}
