// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Suffix appended to extensionless URIs.
pub const DEFAULT_SUFFIX: &str = ".json";
/// Document name implied by a trailing slash.
pub const DEFAULT_INDEX_NAME: &str = "index";
/// Prefix under which dynamic resource instances publish by default.
pub const DEFAULT_DYNAMIC_BASE: &str = "/~hypermedium/dynamic";
/// Buffer size of the engine event stream.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;
