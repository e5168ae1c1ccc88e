// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

pub mod algo;

pub use algo::automaton::{AutomatonStatus, ConvergenceAutomaton, SetOperation};
pub use algo::estimator::{Estimate, Estimator, SampleTally};
pub use algo::relation::{BipartiteRelation, RelationPair, Side};
pub use algo::simulator::{DeepCompleteSimulator, MAX_ATTEMPTS, Sample};
