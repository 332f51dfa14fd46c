// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::LocalProcessorFactory;
use crate::config::{validate_config, DynamicResourceMap, EngineConfig, ProcessorMap};
use crate::engine::HypermediaEngine;
use crate::errors::ConfigError;
use crate::observability::messages::validation::ConfigValidationFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{DynamicResourceDefinition, Processor};

/// Engine runtime builder - assembles registries, validates the
/// configuration against them and installs the configured dynamic resources.
///
/// The built-in processors and dynamic resources are registered up front;
/// custom ones are added with [`RuntimeBuilder::processor`] and
/// [`RuntimeBuilder::dynamic_resource`] and replace built-ins of the same
/// name.
///
/// # Examples
///
/// ```
/// use hypermedium::config::{EngineConfig, RuntimeBuilder};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let config = EngineConfig::from_yaml_str("pre_processors: [{name: self}]").unwrap();
///     let engine = RuntimeBuilder::new(config).build().await.unwrap();
///
///     engine.load_resource("/about", serde_json::json!({"title": "About"}));
///     let results = engine.process_resource("/about").await;
///     assert_eq!(results[0].resource["_links"]["self"]["href"], "/about.json");
/// });
/// ```
pub struct RuntimeBuilder {
    config: EngineConfig,
    processors: ProcessorMap,
    dynamic_resources: DynamicResourceMap,
}

impl RuntimeBuilder {
    pub fn new(config: EngineConfig) -> Self {
        let mut processors = ProcessorMap::new();
        let mut dynamic_resources = DynamicResourceMap::new();
        LocalProcessorFactory::register_all(&mut processors, &mut dynamic_resources);
        Self {
            config,
            processors,
            dynamic_resources,
        }
    }

    /// Register an additional processor.
    pub fn processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.register(processor);
        self
    }

    /// Register an additional dynamic resource definition.
    pub fn dynamic_resource(mut self, definition: Arc<dyn DynamicResourceDefinition>) -> Self {
        self.dynamic_resources.register(definition);
        self
    }

    /// Validate, create the engine and install every configured dynamic
    /// resource in order.
    ///
    /// # Returns
    /// * `Ok(HypermediaEngine)` - ready to load resources
    /// * `Err(ConfigError::Validation)` - every unresolved reference
    /// * `Err(ConfigError::DynamicResource)` - an instance failed to install
    pub async fn build(self) -> Result<HypermediaEngine, ConfigError> {
        if let Err(errors) = validate_config(&self.config, &self.processors, &self.dynamic_resources) {
            ConfigValidationFailed { errors: &errors }.log();
            return Err(ConfigError::Validation(errors));
        }

        let installs = self.config.dynamic_resources.clone();
        let engine = HypermediaEngine::new(self.config, self.processors, self.dynamic_resources);
        for install in installs {
            engine.install_dynamic_resource(install).await?;
        }
        Ok(engine)
    }
}
