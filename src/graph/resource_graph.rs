// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Directed graph of resource/file nodes and dependency edges.
//!
//! An edge `source -> target` records that some processor run for `source`
//! consulted `target`. Each edge carries the set of processors responsible
//! for it. Edges are stored independently of nodes, so a dependency can be
//! wired before its target exists (and survives the target being unloaded).
//!
//! All keys are expected to be normalized already; normalization happens at
//! the engine boundary.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::document::Document;
use crate::graph::{FileNode, Node, ResourceNode};

/// A dependency edge with processor attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    pub processors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ResourceGraph {
    nodes: HashMap<String, Node>,
    /// source -> target -> processors
    outgoing: HashMap<String, BTreeMap<String, BTreeSet<String>>>,
    /// target -> sources
    incoming: HashMap<String, BTreeSet<String>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, uri: &str) -> Option<&Node> {
        self.nodes.get(uri)
    }

    /// Current document of a resource node: processed, else original.
    pub fn get_resource(&self, uri: &str) -> Option<&Document> {
        self.nodes.get(uri).and_then(Node::document)
    }

    /// Path of a file node.
    pub fn get_file(&self, uri: &str) -> Option<&FileNode> {
        match self.nodes.get(uri) {
            Some(Node::File(file)) => Some(file),
            _ => None,
        }
    }

    /// Insert or replace a node, returning the node it replaced.
    pub fn add_node(&mut self, uri: &str, node: Node) -> Option<Node> {
        self.nodes.insert(uri.to_string(), node)
    }

    /// Store the output of a processing run on a resource node.
    ///
    /// Returns `false` if the node is gone or is not a resource.
    pub fn set_processed(&mut self, uri: &str, resource: Document) -> bool {
        match self.nodes.get_mut(uri) {
            Some(Node::Resource(ResourceNode { processed, .. })) => {
                *processed = Some(resource);
                true
            }
            _ => false,
        }
    }

    /// Remove a node and its outgoing edges. Incoming edges are kept so
    /// dependents are rewired automatically if the node comes back.
    pub fn remove_node(&mut self, uri: &str) -> Option<Node> {
        let removed = self.nodes.remove(uri)?;
        self.reset_dependencies(uri);
        Some(removed)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    /// Record that `processor`, running for `source`, consulted `target`.
    ///
    /// Returns whether the attribution is new: either the edge did not exist
    /// or this processor was not yet recorded on it.
    pub fn add_dependency(&mut self, source: &str, target: &str, processor: &str) -> bool {
        let processors = self
            .outgoing
            .entry(source.to_string())
            .or_default()
            .entry(target.to_string())
            .or_default();
        let added = processors.insert(processor.to_string());

        self.incoming
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());
        added
    }

    /// Drop every edge whose source is `uri`.
    pub fn reset_dependencies(&mut self, uri: &str) {
        let Some(targets) = self.outgoing.remove(uri) else {
            return;
        };
        for target in targets.keys() {
            if let Some(sources) = self.incoming.get_mut(target) {
                sources.remove(uri);
                if sources.is_empty() {
                    self.incoming.remove(target);
                }
            }
        }
    }

    /// Outgoing edges of `uri`, ordered by target.
    pub fn dependencies(&self, uri: &str) -> Vec<DependencyEdge> {
        self.outgoing
            .get(uri)
            .map(|targets| {
                targets
                    .iter()
                    .map(|(target, processors)| DependencyEdge {
                        source: uri.to_string(),
                        target: target.clone(),
                        processors: processors.iter().cloned().collect(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sources of edges pointing at `uri`, excluding `uri` itself.
    pub fn dependents(&self, uri: &str) -> Vec<String> {
        self.incoming
            .get(uri)
            .map(|sources| sources.iter().filter(|s| *s != uri).cloned().collect())
            .unwrap_or_default()
    }

    /// All node URIs, sorted.
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.nodes.keys().cloned().collect();
        uris.sort();
        uris
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
