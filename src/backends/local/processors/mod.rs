// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod copy;
pub mod embed;
pub mod extend;
pub mod self_link;

pub use copy::*;
pub use embed::*;
pub use extend::*;
pub use self_link::*;
