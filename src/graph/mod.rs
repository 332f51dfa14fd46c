// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The resource graph: document and file nodes keyed by normalized URI, and
//! the processor-attributed dependency edges discovered while processing.

mod node;
mod resource_graph;
mod uri;

pub use node::{FileNode, Node, ResourceNode};
pub use resource_graph::{DependencyEdge, ResourceGraph};
pub use uri::UriNormalizer;
