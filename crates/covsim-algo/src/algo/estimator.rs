// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Sampled similarity estimate of two clusterings.
//!
//! Samples drawn by [`DeepCompleteSimulator`] are tallied into a weighted
//! joint distribution over (module A, module B) pairs. The marginals of that
//! distribution give the entropies of both clusterings and the joint gives
//! their mutual information, normalized into an NMI score.

use crate::algo::relation::RelationPair;
use crate::algo::simulator::{DeepCompleteSimulator, Sample};
use covsim_common::{CovsimError, EstimatorConfig, ModuleId, ModulePair, Normalization, Result};
use fxhash::FxHashMap;
use tracing::info;

/// Weighted joint distribution of sampled module pairs.
#[derive(Debug, Clone, Default)]
pub struct SampleTally {
    joint: FxHashMap<ModulePair, f64>,
    importance: f64,
    failed_weight: f64,
    samples: usize,
}

impl SampleTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &Sample) {
        *self.joint.entry(sample.pair()).or_insert(0.0) += sample.importance;
        self.importance += sample.importance;
        self.failed_weight += sample.failed_weight;
        self.samples += 1;
    }

    /// Fold in the tally of another stream, e.g. one driven by a fork.
    pub fn merge(&mut self, other: &SampleTally) {
        for (&pair, &weight) in &other.joint {
            *self.joint.entry(pair).or_insert(0.0) += weight;
        }
        self.importance += other.importance;
        self.failed_weight += other.failed_weight;
        self.samples += other.samples;
    }

    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    #[inline]
    pub fn distinct_pairs(&self) -> usize {
        self.joint.len()
    }

    /// Accumulated importance of `pair`.
    pub fn weight_of(&self, pair: ModulePair) -> f64 {
        self.joint.get(&pair).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn failed_weight(&self) -> f64 {
        self.failed_weight
    }

    /// Share of the drawn weight that was spent on failed attempts.
    pub fn failure_ratio(&self) -> f64 {
        let total = self.importance + self.failed_weight;
        if total > 0.0 {
            self.failed_weight / total
        } else {
            0.0
        }
    }

    fn marginals(&self) -> (FxHashMap<ModuleId, f64>, FxHashMap<ModuleId, f64>) {
        let mut first: FxHashMap<ModuleId, f64> = FxHashMap::default();
        let mut second: FxHashMap<ModuleId, f64> = FxHashMap::default();
        for (&(a, b), &weight) in &self.joint {
            *first.entry(a).or_insert(0.0) += weight;
            *second.entry(b).or_insert(0.0) += weight;
        }
        (first, second)
    }

    /// Entropies (nats) of the first and second clustering's marginals.
    pub fn entropies(&self) -> (f64, f64) {
        let (first, second) = self.marginals();
        (
            entropy(first.values().copied(), self.importance),
            entropy(second.values().copied(), self.importance),
        )
    }

    /// Mutual information (nats) of the sampled joint distribution.
    pub fn mutual_information(&self) -> f64 {
        if self.importance <= 0.0 {
            return 0.0;
        }
        let total = self.importance;
        let (first, second) = self.marginals();

        let mut mi = 0.0;
        for (&(a, b), &weight) in &self.joint {
            if weight <= 0.0 {
                continue;
            }
            let p_ab = weight / total;
            let p_a = first[&a] / total;
            let p_b = second[&b] / total;
            mi += p_ab * (p_ab / (p_a * p_b)).ln();
        }
        mi.max(0.0)
    }

    /// Normalized mutual information in [0, 1].
    ///
    /// Two single-module clusterings are identical (1.0); a zero denominator
    /// with some entropy left means no shared information (0.0).
    pub fn nmi(&self, normalization: Normalization) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let (h_a, h_b) = self.entropies();
        if h_a <= 0.0 && h_b <= 0.0 {
            return 1.0;
        }
        let denominator = normalization.denominator(h_a, h_b);
        if denominator <= 0.0 {
            return 0.0;
        }
        (self.mutual_information() / denominator).clamp(0.0, 1.0)
    }

    pub fn estimate(&self, normalization: Normalization) -> Estimate {
        let (entropy_a, entropy_b) = self.entropies();
        Estimate {
            samples: self.samples,
            normalization,
            nmi: self.nmi(normalization),
            mutual_information: self.mutual_information(),
            entropy_a,
            entropy_b,
            failure_ratio: self.failure_ratio(),
            distinct_pairs: self.distinct_pairs(),
        }
    }
}

fn entropy(weights: impl Iterator<Item = f64>, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let h: f64 = weights
        .filter(|&w| w > 0.0)
        .map(|w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum();
    h.max(0.0)
}

/// Summary of a sampled comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub samples: usize,
    pub normalization: Normalization,
    pub nmi: f64,
    pub mutual_information: f64,
    pub entropy_a: f64,
    pub entropy_b: f64,
    pub failure_ratio: f64,
    pub distinct_pairs: usize,
}

/// Draws a fixed number of samples from one stream and summarizes them.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Sample both clusterings of `relations` over their joint vertex set.
    pub fn estimate(&self, relations: &RelationPair) -> Result<Estimate> {
        let vertices = relations.vertex_set();
        let mut simulator = DeepCompleteSimulator::new(relations, &vertices, self.config.seed)?;
        self.run(&mut simulator)
    }

    pub fn run(&self, simulator: &mut DeepCompleteSimulator<'_>) -> Result<Estimate> {
        let tally = self.tally(simulator)?;
        let estimate = tally.estimate(self.config.normalization);
        info!(
            samples = estimate.samples,
            nmi = estimate.nmi,
            failure_ratio = estimate.failure_ratio,
            distinct_pairs = estimate.distinct_pairs,
            "Sampled similarity estimate"
        );
        Ok(estimate)
    }

    /// Draw `config.samples` samples into a fresh tally.
    pub fn tally(&self, simulator: &mut DeepCompleteSimulator<'_>) -> Result<SampleTally> {
        if self.config.samples == 0 {
            return Err(CovsimError::InvalidArgument {
                arg: "samples".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let mut tally = SampleTally::new();
        for _ in 0..self.config.samples {
            tally.record(&simulator.sample()?);
        }
        Ok(tally)
    }
}
