use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast::Receiver;

use crate::backends::local::LocalProcessorFactory;
use crate::backends::stub::{CountingProcessor, FailingProcessor, PanickingProcessor};
use crate::config::{
    DynamicResourceInstall, DynamicResourceMap, EngineConfig, ProcessorMap, ProcessorRef,
    RuntimeBuilder,
};
use crate::document::Document;
use crate::engine::{DynamicResourceApi, Event, HypermediaEngine, ResourceState};
use crate::errors::{DynamicResourceError, ProcessorError};
use crate::traits::{DynamicResource, DynamicResourceDefinition, Processor, ProcessorFn};

/// Integration tests for the hypermedia engine using the built-in processors
#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_engine(config: EngineConfig) -> HypermediaEngine {
        let mut processors = ProcessorMap::new();
        let mut dynamic_resources = DynamicResourceMap::new();
        LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
        HypermediaEngine::new(config, processors, dynamic_resources)
    }

    fn copy_from(from: &str, property: &str) -> Value {
        json!({"name": "copy", "options": {"from": from, "property": property}})
    }

    /// Appends its own name to the document's `trail` array.
    fn trail(name: &'static str) -> Arc<dyn Processor> {
        Arc::new(ProcessorFn::new(name, move |state: &mut ResourceState, _: &Value| {
            let mut resource = state.take_resource();
            let mut entries = resource
                .get("trail")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            entries.push(json!(name));
            resource["trail"] = Value::Array(entries);
            Ok(resource)
        }))
    }

    fn drain(events: &mut Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    fn loads_of(events: &[Event], uri: &str) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::LoadResource { uri: u, .. } if u == uri))
            .count()
    }

    #[tokio::test]
    async fn test_processing_is_idempotent_and_keeps_original() {
        let mut config = EngineConfig::default();
        config.pre_processors.push(ProcessorRef::from("self"));
        let engine = builtin_engine(config);

        let original = json!({
            "title": "Hello",
            "_processors": [{"name": "extend", "options": {"with": {"layout": "post"}}}]
        });
        engine.load_resource("/posts/hello", original.clone());

        let first = engine.process_resource("/posts/hello").await;
        let second = engine.process_resource("/posts/hello").await;

        assert_eq!(first, second);
        assert_eq!(
            first[0].resource,
            json!({
                "title": "Hello",
                "layout": "post",
                "_links": {"self": {"href": "/posts/hello.json"}}
            })
        );
        match engine.node("/posts/hello").unwrap() {
            crate::graph::Node::Resource(node) => assert_eq!(node.original, original),
            other => panic!("Expected resource node, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reprocessing_keeps_output_and_edges() {
        let engine = builtin_engine(EngineConfig::default());
        engine.load_resource("/b", json!({"title": "B", "tags": ["x"]}));
        engine.load_resource(
            "/a",
            json!({"_processors": [copy_from("/b", "title"), copy_from("/b", "tags"), "self"]}),
        );

        let first = engine.process_resource("/a").await;
        let edges_before = engine.dependencies_of("/a");
        let second = engine.process_resource("/a").await;
        let edges_after = engine.dependencies_of("/a");

        assert_eq!(first, second);
        assert_eq!(edges_before.len(), 1);
        assert_eq!(edges_before[0].target, "/b.json");
        assert_eq!(edges_before[0].processors, vec!["copy"]);
        assert_eq!(edges_before, edges_after);
        assert_eq!(engine.dependents_of("/b"), vec!["/a.json"]);
    }

    #[tokio::test]
    async fn test_dependencies_are_discovered_and_reset() {
        let engine = builtin_engine(EngineConfig::default());
        engine.load_resource("/b", json!({"title": "B"}));
        engine.load_resource("/a", json!({"_processors": [copy_from("/b", "title")]}));

        let results = engine.process_resource("/a").await;
        assert_eq!(results[0].resource, json!({"title": "B"}));
        assert_eq!(engine.dependents_of("/b"), vec!["/a.json"]);

        // Reloading without the reference drops the edge on the next run.
        engine.load_resource("/a", json!({"title": "standalone"}));
        engine.process_resource("/a").await;
        assert!(engine.dependencies_of("/a").is_empty());
        assert!(engine.dependents_of("/b").is_empty());
    }

    #[tokio::test]
    async fn test_change_cascades_to_dependents() {
        let engine = builtin_engine(EngineConfig::default());
        engine.load_resource("/b", json!({"title": "old"}));
        engine.load_resource("/a", json!({"_processors": [copy_from("/b", "title")]}));
        engine.load_resource("/c", json!({"_processors": [copy_from("/a", "title")]}));
        engine.process_resource("/b").await;
        engine.process_resource("/a").await;
        engine.process_resource("/c").await;

        engine.load_resource("/b", json!({"title": "new"}));
        let results = engine.process_resource("/b").await;

        let uris: Vec<_> = results.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["/b.json", "/a.json", "/c.json"]);
        assert_eq!(engine.get_resource("/a"), Some(json!({"title": "new"})));
        assert_eq!(engine.get_resource("/c"), Some(json!({"title": "new"})));
    }

    #[tokio::test]
    async fn test_dependency_loaded_later_triggers_reprocessing() {
        let engine = builtin_engine(EngineConfig::default());
        engine.load_resource("/a", json!({"_processors": [copy_from("/b", "title")]}));
        engine.process_resource("/a").await;
        assert_eq!(engine.get_resource("/a"), Some(json!({})));

        engine.load_resource("/b", json!({"title": "late"}));
        engine.process_resource("/b").await;
        assert_eq!(engine.get_resource("/a"), Some(json!({"title": "late"})));
    }

    #[tokio::test]
    async fn test_missing_resource_yields_empty_result() {
        let engine = builtin_engine(EngineConfig::default());
        let mut events = engine.subscribe();

        assert!(engine.process_resource("/nowhere").await.is_empty());
        assert!(matches!(drain(&mut events).as_slice(), [Event::Warning { .. }]));
    }

    #[tokio::test]
    async fn test_cycle_terminates_with_warning() {
        let engine = builtin_engine(EngineConfig::default());
        engine.load_resource("/a", json!({"_processors": [copy_from("/b", "title")], "title": "A"}));
        engine.load_resource("/b", json!({"_processors": [copy_from("/a", "title")], "title": "B"}));
        engine.process_resource("/a").await;
        engine.process_resource("/b").await;

        let mut events = engine.subscribe();
        let results = engine.process_resource("/a").await;

        let uris: Vec<_> = results.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["/a.json", "/b.json", "/a.json"]);
        assert_eq!(results[2].resource, json!({}));

        let warnings: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning { message } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(
            warnings,
            vec!["Dependency cycle detected: /a.json -> /b.json -> /a.json"]
        );
    }

    #[tokio::test]
    async fn test_self_extension_runs_before_post_processors() {
        let mut config = EngineConfig::default();
        config.pre_processors.push(ProcessorRef::from("pre"));
        config.post_processors.push(ProcessorRef::from("post"));

        let mut processors = ProcessorMap::new();
        processors.register(trail("pre"));
        processors.register(trail("p2"));
        processors.register(trail("post"));
        processors.register(Arc::new(ProcessorFn::new(
            "p1",
            |state: &mut ResourceState, _: &Value| {
                let mut resource = state.take_resource();
                resource["trail"] = json!(["pre", "p1"]);
                resource["_processors"] = json!(["p2"]);
                Ok(resource)
            },
        )));
        let engine = HypermediaEngine::new(config, processors, DynamicResourceMap::new());
        let mut events = engine.subscribe();

        engine.load_resource("/a", json!({"_processors": ["p1"]}));
        let results = engine.process_resource("/a").await;

        assert_eq!(results[0].resource, json!({"trail": ["pre", "p1", "p2", "post"]}));
        let processors = drain(&mut events).into_iter().find_map(|e| match e {
            Event::ProcessResource { processors, .. } => Some(processors),
            _ => None,
        });
        assert_eq!(processors.unwrap(), vec!["pre", "p1", "p2", "post"]);
    }

    #[tokio::test]
    async fn test_unknown_processor_degrades_gracefully() {
        let engine = builtin_engine(EngineConfig::default());
        let mut events = engine.subscribe();
        engine.load_resource(
            "/a",
            json!({"title": "kept", "_processors": [{"name": "nope"}, 42, "self"]}),
        );

        let results = engine.process_resource("/a").await;
        assert_eq!(
            results[0].resource,
            json!({"title": "kept", "_links": {"self": {"href": "/a.json"}}})
        );

        let errors: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::ProcessorError { uri, error } => Some((uri, error)),
                _ => None,
            })
            .collect();
        assert_eq!(
            errors,
            vec![
                ("/a.json".to_string(), "unknown processor 'nope'".to_string()),
                ("/a.json".to_string(), "invalid processor reference: 42".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_and_panicking_processors_are_isolated() {
        let mut processors = ProcessorMap::new();
        let mut dynamic_resources = DynamicResourceMap::new();
        LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
        processors.register(Arc::new(FailingProcessor::new("fail")));
        processors.register(Arc::new(PanickingProcessor::new("boom")));
        let engine = HypermediaEngine::new(EngineConfig::default(), processors, dynamic_resources);
        let mut events = engine.subscribe();

        engine.load_resource("/a", json!({"title": "t", "_processors": ["fail", "boom", "self"]}));
        engine.load_resource("/b", json!({"title": "unaffected"}));
        let results = engine.process_resource("/a").await;

        assert_eq!(
            results[0].resource,
            json!({"title": "t", "_links": {"self": {"href": "/a.json"}}})
        );
        let errors: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::ProcessorError { error, .. } => Some(error),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("processor 'fail' failed on '/a.json'"));
        assert_eq!(
            errors[1],
            "processor 'boom' panicked on '/a.json': Simulated processor panic"
        );

        assert_eq!(engine.process_resource("/b").await[0].resource, json!({"title": "unaffected"}));
    }

    #[tokio::test]
    async fn test_resource_unloaded_while_processing_is_not_stored() {
        let mut processors = ProcessorMap::new();
        processors.register(Arc::new(ProcessorFn::new(
            "vanish",
            |state: &mut ResourceState, _: &Value| {
                state.engine().unload_resource(state.uri());
                Ok(state.take_resource())
            },
        )));
        let engine = HypermediaEngine::new(EngineConfig::default(), processors, DynamicResourceMap::new());
        let mut events = engine.subscribe();

        engine.load_resource("/a", json!({"_processors": ["vanish"]}));
        let results = engine.process_resource("/a").await;

        assert!(results.is_empty());
        assert!(!engine.contains("/a"));
        let events = drain(&mut events);
        let warnings: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Warning { message } => Some(message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(warnings, vec!["Resource '/a.json' was unloaded while processing"]);
        assert!(!events.iter().any(|e| matches!(e, Event::ProcessResource { .. })));
    }

    #[tokio::test]
    async fn test_file_nodes_cascade() {
        let mut processors = ProcessorMap::new();
        processors.register(Arc::new(ProcessorFn::new(
            "logo",
            |state: &mut ResourceState, _: &Value| {
                let path = state.get_file("/logo.png");
                let mut resource = state.take_resource();
                resource["logo"] = json!(path.map(|p| p.display().to_string()));
                Ok(resource)
            },
        )));
        let engine = HypermediaEngine::new(EngineConfig::default(), processors, DynamicResourceMap::new());

        engine.load_resource("/a", json!({"_processors": ["logo"]}));
        engine.process_resource("/a").await;
        assert_eq!(engine.get_resource("/a"), Some(json!({"logo": null})));

        engine.load_file("/logo.png", "assets/logo.png");
        let results = engine.process_resource("/logo.png").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].uri, "/a.json");
        assert_eq!(results[0].resource, json!({"logo": "assets/logo.png"}));
    }

    #[tokio::test]
    async fn test_unload_keeps_dependents_wired() {
        let counter = Arc::new(CountingProcessor::new("count"));
        let mut processors = ProcessorMap::new();
        let mut dynamic_resources = DynamicResourceMap::new();
        LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
        processors.register(counter.clone());
        let engine = HypermediaEngine::new(EngineConfig::default(), processors, dynamic_resources);

        engine.load_resource("/b", json!({"title": "B"}));
        engine.load_resource("/a", json!({"_processors": [copy_from("/b", "title"), "count"]}));
        engine.process_resource("/a").await;
        assert_eq!(counter.count(), 1);

        // Unloading does not reprocess dependents.
        assert!(engine.unload_resource("/b").is_some());
        assert_eq!(counter.count(), 1);
        assert_eq!(engine.dependents_of("/b"), vec!["/a.json"]);

        engine.load_resource("/b", json!({"title": "B2"}));
        engine.process_resource("/b").await;
        assert_eq!(counter.count(), 2);
        assert_eq!(engine.get_resource("/a"), Some(json!({"title": "B2"})));
    }

    struct ComposeProcessor;

    #[async_trait]
    impl Processor for ComposeProcessor {
        async fn process(
            &self,
            state: &mut ResourceState,
            options: &Value,
        ) -> Result<Document, ProcessorError> {
            let steps: Vec<ProcessorRef> = serde_json::from_value(options["steps"].clone())
                .map_err(|e| ProcessorError::invalid_options("compose", e.to_string()))?;
            Ok(state.exec_processors(&steps, None).await)
        }

        fn name(&self) -> &str {
            "compose"
        }
    }

    #[tokio::test]
    async fn test_exec_processor_composes_and_attributes_edges() {
        let mut processors = ProcessorMap::new();
        let mut dynamic_resources = DynamicResourceMap::new();
        LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
        processors.register(Arc::new(ComposeProcessor));
        let engine = HypermediaEngine::new(EngineConfig::default(), processors, dynamic_resources);

        engine.load_resource("/b", json!({"title": "B"}));
        engine.load_resource(
            "/a",
            json!({"_processors": [{"name": "compose", "options": {"steps": [copy_from("/b", "title"), {"name": "self"}]}}]}),
        );

        let results = engine.process_resource("/a").await;
        assert_eq!(
            results[0].resource,
            json!({"title": "B", "_links": {"self": {"href": "/a.json"}}})
        );
        let edges = engine.dependencies_of("/a");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].processors, vec!["copy"]);
    }

    async fn indexed_engine() -> HypermediaEngine {
        let mut config = EngineConfig::default();
        config
            .dynamic_resources
            .push(DynamicResourceInstall::new("index", json!({"property": "tags"})).with_id("tags"));
        RuntimeBuilder::new(config).build().await.unwrap()
    }

    #[tokio::test]
    async fn test_index_publishes_once_per_change() {
        let engine = indexed_engine().await;
        let mut events = engine.subscribe();

        engine.load_resource("/posts/a", json!({"tags": ["rust", "async"]}));
        engine.process_resource("/posts/a").await;
        engine.settle().await;

        assert_eq!(loads_of(&drain(&mut events), "/tags.json"), 1);
        assert_eq!(
            engine.get_resource("/tags").unwrap(),
            json!({
                "_links": {"profile": [{"href": "/schema/index"}, {"href": "/schema/index/tags"}]},
                "property": "tags",
                "index": {"async": ["/posts/a.json"], "rust": ["/posts/a.json"]}
            })
        );
        assert_eq!(engine.node("/tags").unwrap().dynamic_owner(), Some("tags"));

        // Same values: nothing to republish.
        engine.process_resource("/posts/a").await;
        engine.settle().await;
        assert_eq!(loads_of(&drain(&mut events), "/tags.json"), 0);

        // Resources without the property never touch the index.
        engine.load_resource("/about", json!({"title": "About"}));
        engine.process_resource("/about").await;
        engine.settle().await;
        assert_eq!(loads_of(&drain(&mut events), "/tags.json"), 0);
    }

    #[tokio::test]
    async fn test_index_changed_values_republish_once() {
        let mut config = EngineConfig::default();
        config
            .dynamic_resources
            .push(DynamicResourceInstall::new("index", json!({"property": "tag"})));
        let engine = RuntimeBuilder::new(config).build().await.unwrap();

        engine.load_resource("/x", json!({"tag": ["a", "b"]}));
        engine.process_resource("/x").await;
        engine.settle().await;
        assert_eq!(
            engine.get_resource("/tag").unwrap()["index"],
            json!({"a": ["/x.json"], "b": ["/x.json"]})
        );

        let mut events = engine.subscribe();
        engine.load_resource("/x", json!({"tag": ["b", "c"]}));
        engine.process_resource("/x").await;
        engine.settle().await;

        assert_eq!(loads_of(&drain(&mut events), "/tag.json"), 1);
        assert_eq!(
            engine.get_resource("/tag").unwrap()["index"],
            json!({"b": ["/x.json"], "c": ["/x.json"]})
        );

        engine.process_resource("/x").await;
        engine.settle().await;
        assert_eq!(loads_of(&drain(&mut events), "/tag.json"), 0);
    }

    #[tokio::test]
    async fn test_index_tracks_changes_and_deletes() {
        let engine = indexed_engine().await;

        engine.load_resource("/posts/a", json!({"tags": ["rust", "async"]}));
        engine.load_resource("/posts/b", json!({"tags": "rust"}));
        engine.process_resource("/posts/a").await;
        engine.process_resource("/posts/b").await;
        engine.settle().await;
        assert_eq!(
            engine.get_resource("/tags").unwrap()["index"],
            json!({"async": ["/posts/a.json"], "rust": ["/posts/a.json", "/posts/b.json"]})
        );

        engine.load_resource("/posts/a", json!({"tags": ["wasm"]}));
        engine.process_resource("/posts/a").await;
        engine.settle().await;
        assert_eq!(
            engine.get_resource("/tags").unwrap()["index"],
            json!({"rust": ["/posts/b.json"], "wasm": ["/posts/a.json"]})
        );

        engine.unload_resource("/posts/b");
        engine.settle().await;
        assert_eq!(
            engine.get_resource("/tags").unwrap()["index"],
            json!({"wasm": ["/posts/a.json"]})
        );
    }

    #[tokio::test]
    async fn test_index_feeds_dependents() {
        let engine = indexed_engine().await;
        engine.load_resource(
            "/tag-list",
            json!({"_processors": [{"name": "copy", "options": {"from": "/tags", "property": "index", "to": "all"}}]}),
        );
        engine.process_resource("/tag-list").await;

        engine.load_resource("/posts/a", json!({"tags": ["rust"]}));
        engine.process_resource("/posts/a").await;
        engine.settle().await;

        assert_eq!(
            engine.get_resource("/tag-list"),
            Some(json!({"all": {"rust": ["/posts/a.json"]}}))
        );
    }

    struct BrokenDefinition;

    struct Broken;

    #[async_trait]
    impl DynamicResource for Broken {
        async fn on_resource_process(
            &mut self,
            _uri: &str,
            _resource: &Document,
            _api: &DynamicResourceApi,
        ) -> anyhow::Result<()> {
            anyhow::bail!("broken on purpose")
        }

        async fn on_node_delete(
            &mut self,
            _uri: &str,
            _node: &crate::graph::Node,
            _api: &DynamicResourceApi,
        ) -> anyhow::Result<()> {
            panic!("delete handler panicked")
        }
    }

    impl DynamicResourceDefinition for BrokenDefinition {
        fn name(&self) -> &str {
            "broken"
        }

        fn instantiate(&self, _options: &Value) -> Result<Box<dyn DynamicResource>, DynamicResourceError> {
            Ok(Box::new(Broken))
        }
    }

    #[tokio::test]
    async fn test_dynamic_resource_failures_are_isolated() {
        let mut config = EngineConfig::default();
        config.dynamic_resources.push(DynamicResourceInstall::new("broken", Value::Null));
        config
            .dynamic_resources
            .push(DynamicResourceInstall::new("index", json!({"property": "tags"})));
        let engine = RuntimeBuilder::new(config)
            .dynamic_resource(Arc::new(BrokenDefinition))
            .build()
            .await
            .unwrap();
        let mut events = engine.subscribe();

        engine.load_resource("/posts/a", json!({"tags": ["rust"]}));
        let results = engine.process_resource("/posts/a").await;
        assert_eq!(results[0].resource, json!({"tags": ["rust"]}));
        engine.unload_resource("/posts/a");
        engine.settle().await;

        // The index still saw both events.
        assert_eq!(engine.get_resource("/tags").unwrap()["index"], json!({}));

        let failures: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::DynamicResourceError { dynamic_resource, uri, error } => {
                    Some((dynamic_resource, uri, error))
                }
                _ => None,
            })
            .filter(|(_, uri, _)| uri.as_deref() == Some("/posts/a.json"))
            .collect();
        assert_eq!(
            failures,
            vec![
                (
                    "broken".to_string(),
                    Some("/posts/a.json".to_string()),
                    "broken on purpose".to_string()
                ),
                (
                    "broken".to_string(),
                    Some("/posts/a.json".to_string()),
                    "panicked: delete handler panicked".to_string()
                ),
            ]
        );
    }
}
