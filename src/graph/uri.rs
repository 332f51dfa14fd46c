// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_INDEX_NAME, DEFAULT_SUFFIX};

/// Maps equivalent URI spellings onto one node key.
///
/// * a trailing slash addresses the implicit index document of that
///   directory (`/blog/` -> `/blog/index.json`)
/// * an extensionless URI gets the default suffix (`/about` -> `/about.json`)
///
/// Normalization is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriNormalizer {
    default_suffix: String,
    index_name: String,
}

impl UriNormalizer {
    pub fn new(default_suffix: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            default_suffix: default_suffix.into(),
            index_name: index_name.into(),
        }
    }

    pub fn normalize(&self, uri: &str) -> String {
        let uri = if uri.is_empty() { "/" } else { uri };
        if uri.ends_with('/') {
            return format!("{}{}{}", uri, self.index_name, self.default_suffix);
        }

        let last_segment = uri.rsplit('/').next().unwrap_or(uri);
        if last_segment.contains('.') {
            uri.to_string()
        } else {
            format!("{}{}", uri, self.default_suffix)
        }
    }

    pub fn default_suffix(&self) -> &str {
        &self.default_suffix
    }
}

impl Default for UriNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX, DEFAULT_INDEX_NAME)
    }
}
