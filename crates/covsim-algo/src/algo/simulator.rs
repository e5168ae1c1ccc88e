// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Deep complete simulator: weighted sampling of corresponding module pairs.
//!
//! Enumerating every module x module combination of two overlapping covers
//! is infeasible, so pairs are drawn by a short random walk instead. From a
//! random start vertex the walk hops through shared modules, feeding the
//! module sets of each visited vertex into one [`ConvergenceAutomaton`] per
//! clustering. Once both automatons hold a single module the pair is
//! reported. Walks that dead-end are retried from a fresh start vertex.
//!
//! Each walk costs at most `2 * (|A(v)| + |B(v)|)` hops, where `v` is the
//! start vertex, so the cost of a sample depends on local module degree
//! rather than on the size of either cover.

use crate::algo::automaton::{AutomatonStatus, ConvergenceAutomaton, SetOperation};
use crate::algo::relation::{RelationPair, Side};
use covsim_common::{CovsimError, ModuleId, ModulePair, Result, VertexId};
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

/// Consecutive failed attempts tolerated before giving up on a sample.
pub const MAX_ATTEMPTS: usize = 1024;

/// Importance of a single walk. Every walk is weighted equally.
const ATTEMPT_IMPORTANCE: f64 = 1.0;

/// One simulation result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Module of the first clustering.
    pub module_a: ModuleId,
    /// Module of the second clustering.
    pub module_b: ModuleId,
    /// Probability mass of this sample, in [0, 1].
    pub importance: f64,
    /// Summed importance of the attempts discarded before this one.
    pub failed_weight: f64,
}

impl Sample {
    #[inline]
    pub fn pair(&self) -> ModulePair {
        (self.module_a, self.module_b)
    }
}

/// Result of a single walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Converged(ModulePair),
    Failed,
}

/// Result of a single hop of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    /// Moved to a new vertex; feed its module sets to the automatons.
    Continue,
    /// A corresponding pair was found without the automatons.
    Converged(ModulePair),
    /// Dead end; the attempt fails.
    Abort,
}

/// Sampler drawing corresponding module pairs from two clusterings.
///
/// The relations and vertex set are borrowed: they stay read-only for as long
/// as any simulator (or fork of it) exists, so forks can run on separate
/// threads without synchronization. The PRNG stream is owned per instance.
#[derive(Debug)]
pub struct DeepCompleteSimulator<'a> {
    relations: &'a RelationPair,
    vertices: &'a [VertexId],
    rng: StdRng,
    index_dist: Uniform<usize>,
}

impl<'a> DeepCompleteSimulator<'a> {
    /// Create a simulator over `vertices`.
    ///
    /// With `seed = None` the stream is seeded from OS entropy; pass a seed
    /// for reproducible sample sequences.
    pub fn new(
        relations: &'a RelationPair,
        vertices: &'a [VertexId],
        seed: Option<u64>,
    ) -> Result<Self> {
        if vertices.is_empty() {
            return Err(CovsimError::EmptyVertexSet);
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::with_rng(relations, vertices, rng))
    }

    fn with_rng(relations: &'a RelationPair, vertices: &'a [VertexId], rng: StdRng) -> Self {
        Self {
            relations,
            vertices,
            rng,
            index_dist: Uniform::new(0, vertices.len()),
        }
    }

    /// Number of vertices samples are started from.
    #[inline]
    pub fn vertices_count(&self) -> usize {
        self.vertices.len()
    }

    /// Sibling simulator over the same data, seeded from OS entropy.
    pub fn fork(&self) -> Self {
        debug!(vertices = self.vertices.len(), "Forking simulator from entropy");
        Self::with_rng(self.relations, self.vertices, StdRng::from_entropy())
    }

    /// Sibling simulator over the same data with an explicit seed.
    pub fn fork_seeded(&self, seed: u64) -> Self {
        debug!(vertices = self.vertices.len(), seed, "Forking seeded simulator");
        Self::with_rng(self.relations, self.vertices, StdRng::seed_from_u64(seed))
    }

    /// Draw one corresponding module pair.
    ///
    /// Retries failed walks up to [`MAX_ATTEMPTS`] times; their importance is
    /// reported in [`Sample::failed_weight`].
    pub fn sample(&mut self) -> Result<Sample> {
        let mut failed_weight = 0.0;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_sample() {
                Attempt::Converged((module_a, module_b)) => {
                    return Ok(Sample {
                        module_a,
                        module_b,
                        importance: ATTEMPT_IMPORTANCE,
                        failed_weight,
                    });
                }
                Attempt::Failed => {
                    failed_weight += ATTEMPT_IMPORTANCE;
                    trace!(attempt, "Sampling attempt failed");
                }
            }
        }

        warn!(
            attempts = MAX_ATTEMPTS,
            failed_weight, "Sampling did not converge, the partitions may be incomparable"
        );
        Err(CovsimError::NonConvergence {
            attempts: MAX_ATTEMPTS,
            failed_weight,
        })
    }

    /// Run one walk from a uniformly drawn start vertex.
    fn try_sample(&mut self) -> Attempt {
        let start = self.vertices[self.index_dist.sample(&mut self.rng)];
        let mut walk = Walk::start(self.relations, start);

        let hop_budget = 2 * (walk.first.len() + walk.second.len());
        let mut first = ConvergenceAutomaton::new(walk.first);
        let mut second = ConvergenceAutomaton::new(walk.second);

        while AutomatonStatus::undecided(first.status(), second.status())
            && walk.hop < hop_budget
        {
            walk.hop += 1;
            let draw = self.index_dist.sample(&mut self.rng);

            match walk.step(draw) {
                Hop::Continue => {
                    let operation = SetOperation::from_parity(draw + walk.hop);
                    first.set_operation(operation);
                    second.set_operation(operation);
                    first.take_set(walk.first);
                    second.take_set(walk.second);
                }
                Hop::Converged(pair) => return Attempt::Converged(pair),
                Hop::Abort => break,
            }
        }

        match (first.module(), second.module()) {
            (Some(a), Some(b)) => Attempt::Converged((a, b)),
            _ => Attempt::Failed,
        }
    }
}

/// Position of a walk: the current vertex and its module sets.
struct Walk<'r> {
    relations: &'r RelationPair,
    vertex: VertexId,
    first: &'r [ModuleId],
    second: &'r [ModuleId],
    /// Starts at 1; also salts the member selection of each hop.
    hop: usize,
}

impl<'r> Walk<'r> {
    fn start(relations: &'r RelationPair, mut vertex: VertexId) -> Self {
        let (mut first, mut second) = relations.modules_of(vertex);
        // Inputs numbered from 1 leave vertex 0 unmapped in both covers.
        if vertex == 0 && first.is_empty() && second.is_empty() {
            vertex += 1;
            (first, second) = relations.modules_of(vertex);
        }
        Self {
            relations,
            vertex,
            first,
            second,
            hop: 1,
        }
    }

    #[inline]
    fn set(&self, side: Side) -> &'r [ModuleId] {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    fn move_to(&mut self, vertex: VertexId) {
        self.vertex = vertex;
        (self.first, self.second) = self.relations.modules_of(vertex);
    }

    /// Take one hop using the random `draw`.
    fn step(&mut self, draw: usize) -> Hop {
        let Some((side, modules)) = self.pick_side(draw) else {
            return Hop::Abort;
        };
        let module = modules[draw % modules.len()];
        let members = self.relations.side(side).members_of(module);
        debug_assert!(
            !members.is_empty(),
            "module {module} has no back relation to vertex {}",
            self.vertex
        );
        if members.is_empty() {
            return Hop::Abort;
        }

        match self.pick_member(members, draw) {
            Some(next) => {
                self.move_to(next);
                Hop::Continue
            }
            None => self.resolve_singleton(side, module, draw),
        }
    }

    /// Odd draws take the first clustering's set, even draws the second.
    /// An empty set (unsynced vertex bases) falls back to the other side.
    fn pick_side(&self, draw: usize) -> Option<(Side, &'r [ModuleId])> {
        let side = if draw % 2 == 1 { Side::First } else { Side::Second };
        [side, side.other()]
            .into_iter()
            .map(|s| (s, self.set(s)))
            .find(|(_, set)| !set.is_empty())
    }

    /// Member at the salted draw position, skipping the current vertex once.
    /// `None` when the module holds nothing but the current vertex.
    fn pick_member(&self, members: &[VertexId], draw: usize) -> Option<VertexId> {
        let mut idx = (draw + self.hop) % members.len();
        if members[idx] == self.vertex {
            idx = (idx + 1) % members.len();
            if members[idx] == self.vertex {
                return None;
            }
        }
        Some(members[idx])
    }

    /// The walk hit `module`, a singleton holding only the current vertex.
    ///
    /// Pairs it with a singleton module of the other clustering when the
    /// current vertex has one; otherwise leaves through the other clustering.
    fn resolve_singleton(&mut self, side: Side, module: ModuleId, draw: usize) -> Hop {
        let other = side.other();
        let alternatives = self.set(other);
        if alternatives.is_empty() {
            return Hop::Abort;
        }

        let relation = self.relations.side(other);
        let singletons: Vec<ModuleId> = alternatives
            .iter()
            .copied()
            .filter(|&m| relation.members_of(m).len() == 1)
            .collect();

        if !singletons.is_empty() {
            let partner = singletons[(draw + self.hop) % singletons.len()];
            trace!(
                vertex = self.vertex,
                module,
                partner,
                "Resolved singleton module pair"
            );
            return Hop::Converged(match side {
                Side::First => (module, partner),
                Side::Second => (partner, module),
            });
        }

        let fallback = alternatives[draw % alternatives.len()];
        let members = relation.members_of(fallback);
        debug_assert!(
            !members.is_empty(),
            "module {fallback} has no back relation to vertex {}",
            self.vertex
        );
        if members.is_empty() {
            return Hop::Abort;
        }

        let next = self.pick_member(members, draw);
        debug_assert!(
            next.is_some(),
            "walk re-entered vertex {} after singleton fix-up",
            self.vertex
        );
        match next {
            Some(next) => {
                self.move_to(next);
                Hop::Continue
            }
            None => Hop::Abort,
        }
    }
}
