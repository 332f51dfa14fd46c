// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in processors and dynamic resources
pub mod config;     // config + registries
pub mod document;   // documents and property paths
pub mod engine;     // hypermedia engine and pipeline
pub mod errors;     // error handling
pub mod graph;      // resource graph
pub mod observability;
pub mod traits;     // plugin abstractions
