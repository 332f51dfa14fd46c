// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while resolving or running processors.
//!
//! None of these abort processing: the engine logs them, publishes a
//! `ProcessorError` event and lets the document pass through the failed step
//! unchanged.

use thiserror::Error;

use crate::errors::PathError;

#[derive(Debug, Error)]
pub enum ProcessorError {
    /// A processor reference named something that was never registered.
    #[error("unknown processor '{name}'")]
    UnknownProcessor { name: String },

    /// A `_processors` entry that is not a `{name, options}` record.
    #[error("invalid processor reference: {entry}")]
    InvalidReference { entry: String },

    /// The options given to a processor could not be interpreted.
    #[error("invalid options for processor '{processor}': {message}")]
    InvalidOptions { processor: String, message: String },

    /// A processor failed while transforming a resource.
    #[error("processor '{processor}' failed on '{uri}': {message}")]
    Failed {
        processor: String,
        uri: String,
        message: String,
    },

    /// A processor panicked while transforming a resource.
    #[error("processor '{processor}' panicked on '{uri}': {message}")]
    Panicked {
        processor: String,
        uri: String,
        message: String,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcessorError {
    /// Shorthand for an [`ProcessorError::InvalidOptions`] error.
    pub fn invalid_options(processor: &str, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            processor: processor.to_string(),
            message: message.into(),
        }
    }

    /// Attach the processor name and URI to an error that lacks them.
    ///
    /// Errors that already carry context are returned as-is.
    pub fn in_context(self, processor: &str, uri: &str) -> Self {
        match self {
            Self::Path(_) | Self::Other(_) => Self::Failed {
                processor: processor.to_string(),
                uri: uri.to_string(),
                message: self.to_string(),
            },
            other => other,
        }
    }
}
