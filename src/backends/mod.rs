// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in processor and dynamic resource backends.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process hypermedia processors and dynamic resources:
//! - **Links**: `self` writes the resource's own link
//! - **Composition**: `extend` merges fixed content, `copy` pulls a property
//!   from another resource, `embed` inlines linked resources
//! - **Derived resources**: the `index` dynamic resource
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities for engine development (only available in test builds):
//! - **StubProcessor**: Pass-through processor
//! - **FailingProcessor**: Simulates failures for error handling tests
//! - **PanickingProcessor**: Simulates panics
//! - **CountingProcessor**: Counts invocations
//!
//! # Example
//! ```rust
//! use hypermedium::backends::local::LocalProcessorFactory;
//! use hypermedium::config::{DynamicResourceMap, ProcessorMap};
//!
//! let mut processors = ProcessorMap::new();
//! let mut dynamic_resources = DynamicResourceMap::new();
//! LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
//!
//! assert!(processors.contains_key("embed"));
//! assert!(dynamic_resources.contains_key("index"));
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
