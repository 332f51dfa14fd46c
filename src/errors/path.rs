// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while parsing or writing property paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("property path is empty")]
    EmptyPath,

    #[error("invalid property path: {path}")]
    InvalidPath { path: String },

    #[error("segment '{segment}' cannot index into an array")]
    NotAnIndex { segment: String },

    #[error("cannot traverse into segment '{segment}'")]
    NotTraversable { segment: String },
}
