// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the engine. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep structured fields and human text in one place
//! * Provide consistent, structured logging output
//!
//! Logging is the operator-facing channel. Programmatic consumers subscribe
//! to the engine's [`Event`](crate::engine::Event) stream instead; every event
//! published there has a matching message here.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - load/unload, processing lifecycle, dependencies and cycles
//! * `messages::processor` - processor execution and failures
//! * `messages::dynamic` - dynamic resource installation, publication and failures
//! * `messages::validation` - configuration validation
//!
//! # Usage
//!
//! ```rust
//! use hypermedium::observability::messages::{engine::ResourceNotFound, StructuredLog};
//!
//! let msg = ResourceNotFound { uri: "/missing.json" };
//! msg.log();
//! ```

pub mod messages;
