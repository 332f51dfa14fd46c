// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it through `tracing` at its own level with
//! structured fields.

use tracing::Span;

pub mod dynamic;
pub mod engine;
pub mod processor;
pub mod validation;

/// A log record that knows its level and structured fields.
pub trait StructuredLog {
    /// Emit the record at its level.
    fn log(&self);

    /// Build a span carrying the record's fields.
    fn span(&self, name: &str) -> Span;
}
