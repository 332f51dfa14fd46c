// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use serde::Serialize;

use crate::document::Document;

/// A node of the resource graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Resource(ResourceNode),
    File(FileNode),
}

/// A tracked document.
///
/// `original` is the authoritative input and is never mutated by processing;
/// `processed` holds the output of the latest processing run, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    pub original: Document,
    pub processed: Option<Document>,
    /// Id of the dynamic resource instance that created this node.
    pub dynamic_owner: Option<String>,
}

/// An opaque asset. Other resources may depend on it, but it is never
/// transformed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNode {
    pub path: PathBuf,
}

impl Node {
    /// The current document value: processed if available, else original.
    /// Files have no document value.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Node::Resource(node) => Some(node.processed.as_ref().unwrap_or(&node.original)),
            Node::File(_) => None,
        }
    }

    pub fn dynamic_owner(&self) -> Option<&str> {
        match self {
            Node::Resource(node) => node.dynamic_owner.as_deref(),
            Node::File(_) => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }
}

impl ResourceNode {
    pub fn new(original: Document, dynamic_owner: Option<String>) -> Self {
        Self {
            original,
            processed: None,
            dynamic_owner,
        }
    }
}
