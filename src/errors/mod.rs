// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod dynamic_resource;
mod path;
mod processor;

pub use config::{ConfigError, ValidationError};
pub use dynamic_resource::DynamicResourceError;
pub use path::PathError;
pub use processor::ProcessorError;
