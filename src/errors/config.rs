// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::DynamicResourceError;

/// Problems found while validating an engine configuration against the
/// registered processors and dynamic resource definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A global pre/post processor names an unregistered processor.
    #[error("{stage} processor '{name}' is not registered")]
    UnknownProcessor {
        /// `pre` or `post`
        stage: &'static str,
        name: String,
    },

    /// A dynamic resource install names an unregistered definition.
    #[error("dynamic resource definition '{name}' is not registered")]
    UnknownDynamicResource { name: String },

    /// Two dynamic resource installs share an instance id.
    #[error("duplicate dynamic resource instance id: '{id}'")]
    DuplicateInstanceId { id: String },
}

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config format '{path}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    DynamicResource(#[from] DynamicResourceError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
