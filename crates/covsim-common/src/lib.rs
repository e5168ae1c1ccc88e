// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

pub mod api {
    pub mod error;
}

pub mod config;

pub mod core {
    pub mod id;
}

// Re-exports for convenience
pub use api::error::{CovsimError, Result};
pub use config::{EstimatorConfig, Normalization};
pub use core::id::{ModuleId, ModulePair, VertexId};
