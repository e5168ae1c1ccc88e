// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Sampling engine for comparing two overlapping clusterings.
//!
//! # Architecture
//!
//! - **BipartiteRelation**: immutable CSR index of one clustering, queryable
//!   vertex -> modules (forward) and module -> members (backward).
//!
//! - **ConvergenceAutomaton**: narrows a running candidate module set by
//!   alternating intersection and union until one module is left.
//!
//! - **DeepCompleteSimulator**: random walk over the two relations that
//!   drives one automaton per clustering and returns a corresponding module
//!   pair, retrying failed walks.
//!
//! - **Estimator**: aggregates samples into a joint module distribution and
//!   reports the normalized mutual information of the two clusterings.
//!
//! # Example
//!
//! ```ignore
//! use covsim_algo::{BipartiteRelation, DeepCompleteSimulator, RelationPair};
//!
//! let first = BipartiteRelation::from_modules([(10, vec![0, 1]), (11, vec![2, 3])]);
//! let second = BipartiteRelation::from_modules([(20, vec![0, 2]), (21, vec![1, 3])]);
//! let relations = RelationPair::new(first, second);
//! let vertices = relations.vertex_set();
//!
//! let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(42))?;
//! let sample = sim.sample()?;
//! ```

mod id_map;
pub mod automaton;
pub mod estimator;
pub mod relation;
pub mod simulator;

pub use id_map::IdMap;

#[cfg(test)]
pub mod test_utils;
