// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration validation found problems.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use hypermedium::errors::ValidationError;
/// use hypermedium::observability::messages::validation::ConfigValidationFailed;
///
/// let errors = vec![ValidationError::UnknownDynamicResource { name: "calendar".to_string() }];
/// let msg = ConfigValidationFailed { errors: &errors };
///
/// assert!(msg.to_string().contains("calendar"));
/// ```
pub struct ConfigValidationFailed<'a> {
    pub errors: &'a [ValidationError],
}

impl Display for ConfigValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration has {} problem(s)", self.errors.len())?;
        for error in self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl StructuredLog for ConfigValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error_count = self.errors.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "config_validation",
            span_name = name,
            error_count = self.errors.len(),
        )
    }
}
