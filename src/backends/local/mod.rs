// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dynamic_resources;
pub mod factory;
pub mod processors;

pub use dynamic_resources::*;
pub use factory::LocalProcessorFactory;
pub use processors::*;
