// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation against the processor and dynamic resource
//! registries.
//!
//! # Validation Pipeline
//!
//! 1. **Processor Resolution**: every global pre/post processor is registered
//! 2. **Definition Resolution**: every dynamic resource install names a
//!    registered definition
//! 3. **Instance Uniqueness**: instance ids (explicit or defaulted to the
//!    definition name) are unique
//!
//! All checks run and their errors are accumulated, so a user sees every
//! problem at once rather than fixing them one by one.
//!
//! Local `_processors` entries live inside documents and are not validated
//! here: an unknown name there is reported per document at processing time.
//!
//! # Example
//! ```rust
//! use hypermedium::config::{validate_config, DynamicResourceMap, EngineConfig, ProcessorMap, ProcessorRef};
//! use hypermedium::errors::ValidationError;
//!
//! let mut config = EngineConfig::default();
//! config.pre_processors.push(ProcessorRef::from("missing"));
//!
//! let errors = validate_config(&config, &ProcessorMap::new(), &DynamicResourceMap::new()).unwrap_err();
//! assert_eq!(errors, vec![ValidationError::UnknownProcessor {
//!     stage: "pre",
//!     name: "missing".to_string(),
//! }]);
//! ```

use std::collections::HashSet;

use crate::config::{DynamicResourceMap, EngineConfig, ProcessorMap};
use crate::errors::ValidationError;

/// Validates a configuration against the registries it will run with.
///
/// # Returns
///
/// * `Ok(())` - every reference resolves
/// * `Err(Vec<ValidationError>)` - all problems found
pub fn validate_config(
    config: &EngineConfig,
    processors: &ProcessorMap,
    dynamic_resources: &DynamicResourceMap,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(validate_global_processors(config, processors));
    errors.extend(validate_dynamic_definitions(config, dynamic_resources));
    errors.extend(validate_unique_instance_ids(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_global_processors(config: &EngineConfig, processors: &ProcessorMap) -> Vec<ValidationError> {
    let stages = [("pre", &config.pre_processors), ("post", &config.post_processors)];

    stages
        .into_iter()
        .flat_map(|(stage, refs)| {
            refs.iter()
                .filter(|r| !processors.contains_key(&r.name))
                .map(move |r| ValidationError::UnknownProcessor {
                    stage,
                    name: r.name.clone(),
                })
        })
        .collect()
}

fn validate_dynamic_definitions(
    config: &EngineConfig,
    dynamic_resources: &DynamicResourceMap,
) -> Vec<ValidationError> {
    config
        .dynamic_resources
        .iter()
        .filter(|install| !dynamic_resources.contains_key(&install.name))
        .map(|install| ValidationError::UnknownDynamicResource {
            name: install.name.clone(),
        })
        .collect()
}

fn validate_unique_instance_ids(config: &EngineConfig) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for install in &config.dynamic_resources {
        let id = install.instance_id();
        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateInstanceId { id: id.to_string() });
        }
    }
    errors
}
