// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Bipartite vertex <-> module index - dense CSR views of one clustering.
//!
//! A `BipartiteRelation` is an immutable, lookup-optimized view of a cover.
//! It provides:
//! - Forward lookup: vertex -> ascending slice of the modules containing it
//! - Backward lookup: module -> ascending slice of its member vertices
//!
//! Both directions are stored in CSR form (offsets + flat id array), so a
//! lookup is one slot resolution plus a slice, with no allocation.

use crate::algo::IdMap;
use covsim_common::{ModuleId, VertexId};
use tracing::debug;

/// Membership list for CSR construction: (row_slot, value) pairs.
type SlotEdgeList = Vec<(u32, u32)>;

/// Which of the two clusterings a module set or relation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// The opposite clustering.
    #[inline]
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Dense CSR index of a single clustering.
#[derive(Debug, Clone)]
pub struct BipartiteRelation {
    /// Vertex id <-> vertex slot
    vertex_ids: IdMap,
    /// Module id <-> module slot
    module_ids: IdMap,

    /// Forward: CSR over vertex slots
    vertex_offsets: Vec<u32>, // [V+1]
    vertex_modules: Vec<ModuleId>, // [E]

    /// Backward: CSR over module slots
    module_offsets: Vec<u32>, // [M+1]
    module_members: Vec<VertexId>, // [E]
}

impl BipartiteRelation {
    /// Build a relation from (vertex, module) memberships.
    ///
    /// Duplicate memberships are collapsed; order of the input is irrelevant.
    pub fn from_memberships<I>(memberships: I) -> Self
    where
        I: IntoIterator<Item = (VertexId, ModuleId)>,
    {
        let mut pairs: Vec<(VertexId, ModuleId)> = memberships.into_iter().collect();
        pairs.sort_unstable();
        pairs.dedup();

        let vertex_ids = IdMap::from_ids(pairs.iter().map(|&(v, _)| v));
        let module_ids = IdMap::from_ids(pairs.iter().map(|&(_, m)| m));

        // `pairs` is ordered by (vertex, module): rows come out ascending.
        let forward: SlotEdgeList = pairs
            .iter()
            .map(|&(v, m)| (slot_of(&vertex_ids, v), m))
            .collect();

        let mut backward: SlotEdgeList = pairs
            .iter()
            .map(|&(v, m)| (slot_of(&module_ids, m), v))
            .collect();
        backward.sort_unstable();

        let (vertex_offsets, vertex_modules) = build_csr(vertex_ids.len(), &forward);
        let (module_offsets, module_members) = build_csr(module_ids.len(), &backward);

        let relation = Self {
            vertex_ids,
            module_ids,
            vertex_offsets,
            vertex_modules,
            module_offsets,
            module_members,
        };
        debug!(
            vertices = relation.vertex_count(),
            modules = relation.module_count(),
            memberships = relation.membership_count(),
            memory_bytes = relation.memory_size(),
            "Built bipartite relation"
        );
        relation
    }

    /// Build a relation from a module-major listing, the shape of cover files.
    pub fn from_modules<I, M>(modules: I) -> Self
    where
        I: IntoIterator<Item = (ModuleId, M)>,
        M: IntoIterator<Item = VertexId>,
    {
        Self::from_memberships(
            modules
                .into_iter()
                .flat_map(|(m, members)| members.into_iter().map(move |v| (v, m))),
        )
    }

    /// Modules containing `vertex`, ascending. Empty for unknown vertices.
    #[inline]
    pub fn modules_of(&self, vertex: VertexId) -> &[ModuleId] {
        match self.vertex_ids.to_slot(vertex) {
            Some(slot) => csr_row(&self.vertex_offsets, &self.vertex_modules, slot),
            None => &[],
        }
    }

    /// Member vertices of `module`, ascending. Empty for unreferenced modules.
    #[inline]
    pub fn members_of(&self, module: ModuleId) -> &[VertexId] {
        match self.module_ids.to_slot(module) {
            Some(slot) => csr_row(&self.module_offsets, &self.module_members, slot),
            None => &[],
        }
    }

    /// Number of vertices with at least one module.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    /// Number of non-empty modules.
    #[inline]
    pub fn module_count(&self) -> usize {
        self.module_ids.len()
    }

    /// Number of distinct (vertex, module) memberships.
    #[inline]
    pub fn membership_count(&self) -> usize {
        self.vertex_modules.len()
    }

    /// Vertices of this clustering, ascending.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        self.vertex_ids.ids()
    }

    /// Modules of this clustering, ascending.
    #[inline]
    pub fn modules(&self) -> &[ModuleId] {
        self.module_ids.ids()
    }

    /// Memory usage in bytes.
    pub fn memory_size(&self) -> usize {
        (self.vertex_offsets.len()
            + self.vertex_modules.len()
            + self.module_offsets.len()
            + self.module_members.len())
            * 4
            + self.vertex_ids.memory_size()
            + self.module_ids.memory_size()
    }
}

/// The two clusterings being compared.
#[derive(Debug, Clone)]
pub struct RelationPair {
    pub first: BipartiteRelation,
    pub second: BipartiteRelation,
}

impl RelationPair {
    pub fn new(first: BipartiteRelation, second: BipartiteRelation) -> Self {
        Self { first, second }
    }

    /// Relation of the given clustering.
    #[inline]
    pub fn side(&self, side: Side) -> &BipartiteRelation {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    /// Module sets of `vertex` in both clusterings.
    ///
    /// Either set may be empty when the two covers were built over different
    /// vertex bases.
    #[inline]
    pub fn modules_of(&self, vertex: VertexId) -> (&[ModuleId], &[ModuleId]) {
        (self.first.modules_of(vertex), self.second.modules_of(vertex))
    }

    /// Sorted union of the vertices known to either clustering.
    pub fn vertex_set(&self) -> Vec<VertexId> {
        let (a, b) = (self.first.vertices(), self.second.vertices());
        let mut merged = Vec::with_capacity(a.len().max(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] < b[j] {
                merged.push(a[i]);
                i += 1;
            } else if b[j] < a[i] {
                merged.push(b[j]);
                j += 1;
            } else {
                merged.push(a[i]);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        merged
    }
}

#[inline]
fn slot_of(map: &IdMap, id: u32) -> u32 {
    map.to_slot(id).expect("id map is built from the same memberships")
}

#[inline]
fn csr_row<'a>(offsets: &[u32], values: &'a [u32], slot: u32) -> &'a [u32] {
    let start = offsets[slot as usize] as usize;
    let end = offsets[slot as usize + 1] as usize;
    &values[start..end]
}

/// Build CSR from a slot-ordered edge list.
fn build_csr(row_count: usize, edges: &[(u32, u32)]) -> (Vec<u32>, Vec<u32>) {
    if row_count == 0 {
        return (vec![0], Vec::new());
    }

    // Count degrees
    let mut degrees = vec![0u32; row_count];
    for &(row, _) in edges {
        degrees[row as usize] += 1;
    }

    // Build offsets (prefix sum)
    let mut offsets = vec![0u32; row_count + 1];
    for i in 0..row_count {
        offsets[i + 1] = offsets[i] + degrees[i];
    }

    // Fill values, preserving edge order within a row
    let mut values = vec![0u32; edges.len()];
    let mut current = offsets.clone();

    for &(row, value) in edges {
        let idx = current[row as usize] as usize;
        values[idx] = value;
        current[row as usize] += 1;
    }

    (offsets, values)
}
