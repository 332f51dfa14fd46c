// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dynamic_map;
mod loader;
mod processor_map;
mod runtime;
mod validation;

pub mod consts;

pub use dynamic_map::DynamicResourceMap;
pub use loader::{
    load_and_validate_config, load_config, DynamicResourceInstall, EngineConfig, InstanceConfig,
    ProcessorRef,
};
pub use processor_map::ProcessorMap;
pub use runtime::RuntimeBuilder;
pub use validation::validate_config;
