// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use std::fmt;
use std::str::FromStr;

/// How mutual information is normalized into an NMI score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// `I(A;B) / max(H(A), H(B))`
    #[default]
    Max,
    /// `I(A;B) / sqrt(H(A) * H(B))`
    Sqrt,
    /// `2 * I(A;B) / (H(A) + H(B))`
    Arithmetic,
}

impl Normalization {
    /// Denominator for the given pair of entropies.
    pub fn denominator(self, h_a: f64, h_b: f64) -> f64 {
        match self {
            Normalization::Max => h_a.max(h_b),
            Normalization::Sqrt => (h_a * h_b).sqrt(),
            Normalization::Arithmetic => (h_a + h_b) / 2.0,
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" => Ok(Normalization::Max),
            "sqrt" => Ok(Normalization::Sqrt),
            "arithmetic" | "avg" => Ok(Normalization::Arithmetic),
            other => Err(format!(
                "unknown normalization '{}', expected max, sqrt or arithmetic",
                other
            )),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Normalization::Max => "max",
            Normalization::Sqrt => "sqrt",
            Normalization::Arithmetic => "arithmetic",
        };
        f.write_str(name)
    }
}

/// Configuration for a sampled similarity estimate.
#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    /// Number of successful samples to draw (default: 10_000)
    pub samples: usize,

    /// Seed for the sampling stream; `None` seeds from OS entropy
    pub seed: Option<u64>,

    /// NMI normalization (default: max)
    pub normalization: Normalization,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            samples: 10_000,
            seed: None,
            normalization: Normalization::default(),
        }
    }
}
