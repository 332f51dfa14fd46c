// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::PathError;

/// Errors raised by the dynamic resource framework.
#[derive(Debug, Error)]
pub enum DynamicResourceError {
    /// An install referenced a definition that was never registered.
    #[error("unknown dynamic resource definition '{name}'")]
    UnknownDefinition { name: String },

    /// Two installs resolved to the same instance id.
    #[error("dynamic resource instance '{id}' is already installed")]
    DuplicateInstance { id: String },

    /// The instance options could not be interpreted by the definition.
    #[error("invalid options for dynamic resource '{name}': {message}")]
    InvalidOptions { name: String, message: String },

    /// A lifecycle callback failed.
    #[error("dynamic resource '{instance}' failed on '{uri}': {source}")]
    Callback {
        instance: String,
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
