// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dynamic_resource;
pub mod processor;

pub use dynamic_resource::{DynamicResource, DynamicResourceDefinition};
pub use processor::{Processor, ProcessorFn};
