// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Identifier types shared by the relation index and the samplers.
//!
//! Vertices and modules are addressed by the external ids found in the input
//! covers. Both are kept at the 32-bit width the algorithm crate uses for its
//! dense slots, so an id can be stored in a CSR array without conversion.

/// External vertex id, as it appears in a cover file.
pub type VertexId = u32;

/// External module (cluster) id. Module ids are scoped to one clustering:
/// module `7` of the first cover and module `7` of the second are unrelated.
pub type ModuleId = u32;

/// A pair of corresponding modules, first clustering then second.
pub type ModulePair = (ModuleId, ModuleId);
