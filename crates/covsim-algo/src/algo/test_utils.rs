// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::algo::relation::{BipartiteRelation, RelationPair};
use covsim_common::{ModuleId, VertexId};

pub fn build_test_relation(modules: &[(ModuleId, &[VertexId])]) -> BipartiteRelation {
    BipartiteRelation::from_modules(
        modules
            .iter()
            .map(|&(module, members)| (module, members.iter().copied())),
    )
}

pub fn build_test_relations(
    first: &[(ModuleId, &[VertexId])],
    second: &[(ModuleId, &[VertexId])],
) -> RelationPair {
    RelationPair::new(build_test_relation(first), build_test_relation(second))
}
