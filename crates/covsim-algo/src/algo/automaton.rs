// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Convergence automaton narrowing a candidate module set.
//!
//! One automaton runs per clustering per sampling attempt. It starts from
//! the module set of the walk's start vertex and folds in the module set of
//! every vertex the walk visits, using intersection or union as directed by
//! the walk. The automaton has converged once exactly one module remains.

use covsim_common::ModuleId;

/// Progress of a convergence automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonStatus {
    /// More than one candidate module remains.
    Pending,
    /// Exactly one candidate module remains.
    Success,
    /// The candidate set became empty. Terminal.
    Failed,
}

impl AutomatonStatus {
    /// Whether a walk driving two automatons should keep going: neither has
    /// failed and at least one still holds several candidates.
    ///
    /// `Success` is not terminal, a later union can widen it again.
    #[inline]
    pub fn undecided(first: AutomatonStatus, second: AutomatonStatus) -> bool {
        use AutomatonStatus::*;
        first != Failed && second != Failed && (first == Pending || second == Pending)
    }
}

/// Set operation applied by [`ConvergenceAutomaton::take_set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetOperation {
    #[default]
    Intersection,
    Union,
}

impl SetOperation {
    /// Intersection for odd `n`, union for even `n`.
    #[inline]
    pub fn from_parity(n: usize) -> Self {
        if n % 2 == 1 {
            SetOperation::Intersection
        } else {
            SetOperation::Union
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvergenceAutomaton {
    candidates: Vec<ModuleId>,
    operation: SetOperation,
    status: AutomatonStatus,
    scratch: Vec<ModuleId>,
}

impl ConvergenceAutomaton {
    /// Seed an automaton with the module set of the start vertex.
    pub fn new(modules: &[ModuleId]) -> Self {
        let mut candidates = modules.to_vec();
        candidates.sort_unstable();
        candidates.dedup();
        let status = status_of(&candidates);
        Self {
            candidates,
            operation: SetOperation::default(),
            status,
            scratch: Vec::new(),
        }
    }

    pub fn set_operation(&mut self, operation: SetOperation) {
        self.operation = operation;
    }

    /// Select intersection (`true`) or union (`false`).
    pub fn set_operation_kind(&mut self, is_intersection: bool) {
        self.operation = if is_intersection {
            SetOperation::Intersection
        } else {
            SetOperation::Union
        };
    }

    /// Fold `modules` into the candidate set with the current operation.
    ///
    /// `modules` must be ascending and free of duplicates, which is what
    /// `BipartiteRelation::modules_of` returns. A failed automaton ignores
    /// further sets.
    pub fn take_set(&mut self, modules: &[ModuleId]) {
        debug_assert!(
            modules.windows(2).all(|w| w[0] < w[1]),
            "take_set expects a strictly ascending module set"
        );
        if self.status == AutomatonStatus::Failed {
            return;
        }

        self.scratch.clear();
        match self.operation {
            SetOperation::Intersection => {
                intersect_into(&self.candidates, modules, &mut self.scratch)
            }
            SetOperation::Union => union_into(&self.candidates, modules, &mut self.scratch),
        }
        std::mem::swap(&mut self.candidates, &mut self.scratch);
        self.status = status_of(&self.candidates);
    }

    #[inline]
    pub fn status(&self) -> AutomatonStatus {
        self.status
    }

    /// The converged module; `None` unless the status is `Success`.
    #[inline]
    pub fn module(&self) -> Option<ModuleId> {
        match self.status {
            AutomatonStatus::Success => self.candidates.first().copied(),
            _ => None,
        }
    }

    /// Current candidate modules, ascending.
    #[inline]
    pub fn candidates(&self) -> &[ModuleId] {
        &self.candidates
    }
}

fn status_of(candidates: &[ModuleId]) -> AutomatonStatus {
    match candidates.len() {
        0 => AutomatonStatus::Failed,
        1 => AutomatonStatus::Success,
        _ => AutomatonStatus::Pending,
    }
}

fn intersect_into(a: &[ModuleId], b: &[ModuleId], out: &mut Vec<ModuleId>) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
}

fn union_into(a: &[ModuleId], b: &[ModuleId], out: &mut Vec<ModuleId>) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}
