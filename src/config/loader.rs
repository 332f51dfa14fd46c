// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::consts::{
    DEFAULT_DYNAMIC_BASE, DEFAULT_EVENT_CAPACITY, DEFAULT_INDEX_NAME, DEFAULT_SUFFIX,
};
use crate::config::{validate_config, DynamicResourceMap, ProcessorMap};
use crate::errors::{ConfigError, ProcessorError};
use crate::graph::UriNormalizer;

/// Main configuration structure for the hypermedia engine.
///
/// Every field has a default, so an empty file is a valid configuration.
/// It is typically loaded from a YAML or TOML file.
///
/// # Fields
/// * `default_suffix` - Suffix appended to extensionless URIs
/// * `index_name` - Document name implied by a trailing slash
/// * `event_capacity` - Buffer size of the event stream
/// * `dynamic_base` - Prefix of the default base URI of dynamic resource instances
/// * `pre_processors` - Global processors run before the local `_processors`
/// * `post_processors` - Global processors run after the local `_processors`
/// * `dynamic_resources` - Dynamic resource instances to install
///
/// # Example
/// ```yaml
/// default_suffix: ".json"
/// pre_processors:
///   - name: self
/// dynamic_resources:
///   - name: index
///     id: tags
///     options:
///       property: tags
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_suffix: String,
    pub index_name: String,
    pub event_capacity: usize,
    pub dynamic_base: String,
    pub pre_processors: Vec<ProcessorRef>,
    pub post_processors: Vec<ProcessorRef>,
    pub dynamic_resources: Vec<DynamicResourceInstall>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_suffix: DEFAULT_SUFFIX.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            dynamic_base: DEFAULT_DYNAMIC_BASE.to_string(),
            pre_processors: Vec::new(),
            post_processors: Vec::new(),
            dynamic_resources: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn uri_normalizer(&self) -> UriNormalizer {
        UriNormalizer::new(self.default_suffix.clone(), self.index_name.clone())
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }
}

/// A reference to a registered processor, as it appears in global stages or
/// in a document's `_processors` worklist.
///
/// # Example
/// ```yaml
/// name: copy
/// options:
///   from: /authors/ann
///   property: name
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessorRef {
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

impl ProcessorRef {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// Interpret a `_processors` entry.
    ///
    /// Accepts a `{name, options?}` object or a bare name string.
    pub fn from_value(entry: &Value) -> Result<Self, ProcessorError> {
        match entry {
            Value::String(name) => Ok(Self::new(name.clone(), Value::Null)),
            Value::Object(_) => {
                serde_json::from_value(entry.clone()).map_err(|_| ProcessorError::InvalidReference {
                    entry: entry.to_string(),
                })
            }
            other => Err(ProcessorError::InvalidReference {
                entry: other.to_string(),
            }),
        }
    }
}

impl From<&str> for ProcessorRef {
    fn from(name: &str) -> Self {
        Self::new(name, Value::Null)
    }
}

/// An installation of a dynamic resource definition.
///
/// # Fields
/// * `name` - Registered definition name
/// * `id` - Instance id; defaults to `name`. Must be unique per engine
/// * `options` - Definition-specific options
/// * `config` - Optional instance configuration (base URI)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DynamicResourceInstall {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub config: Option<InstanceConfig>,
}

impl DynamicResourceInstall {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            id: None,
            options,
            config: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.config = Some(InstanceConfig {
            base_uri: Some(base_uri.into()),
        });
        self
    }

    pub fn instance_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InstanceConfig {
    pub base_uri: Option<String>,
}

/// Load a config from a YAML or TOML file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => EngineConfig::from_yaml_str(&content),
        Some("toml") => EngineConfig::from_toml_str(&content),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load a config and validate it against the given registries.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
    processors: &ProcessorMap,
    dynamic_resources: &DynamicResourceMap,
) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg, processors, dynamic_resources).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
