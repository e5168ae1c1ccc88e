// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Sorted mapping between external ids and dense CSR slots.
//!
//! Cover files name vertices and modules with arbitrary, possibly sparse
//! integers. The relation stores its offset arrays by slot (0..N), and slot
//! order is id order, so the map is a single sorted vector searched by
//! bisection.

/// Ascending, duplicate-free ids; the position of an id is its slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: Vec<u32>,
}

impl IdMap {
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.shrink_to_fit();
        Self { ids }
    }

    #[inline]
    pub fn to_slot(&self, id: u32) -> Option<u32> {
        self.ids.binary_search(&id).ok().map(|i| i as u32)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All ids in slot order.
    #[inline]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Memory usage in bytes.
    pub fn memory_size(&self) -> usize {
        self.ids.capacity() * std::mem::size_of::<u32>()
    }
}
