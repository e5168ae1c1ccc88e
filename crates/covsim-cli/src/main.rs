// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use covsim_algo::{DeepCompleteSimulator, Estimate, Estimator, RelationPair};
use covsim_common::{EstimatorConfig, Normalization};
use prettytable::{Cell, Row, Table};
use std::path::{Path, PathBuf};

pub mod loader;

#[derive(Parser)]
#[command(name = "covsim")]
#[command(about = "Sampled comparison of overlapping clusterings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the normalized mutual information of two covers
    Nmi {
        /// First cover file
        cover_a: PathBuf,
        /// Second cover file
        cover_b: PathBuf,
        /// Number of samples to draw
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Denominator used to normalize the mutual information
        #[arg(long, default_value = "max")]
        normalization: Normalization,
    },
    /// Print raw samples
    Sample {
        cover_a: PathBuf,
        cover_b: PathBuf,
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Nmi {
            cover_a,
            cover_b,
            samples,
            seed,
            normalization,
        } => {
            let relations = load(&cover_a, &cover_b)?;
            let estimator = Estimator::new(EstimatorConfig {
                samples,
                seed,
                normalization,
            });
            let estimate = estimator.estimate(&relations)?;
            print_estimate(&estimate);
            if estimate.failure_ratio > 0.5 {
                eprintln!(
                    "{} most attempts failed ({:.1}%); the covers may hardly overlap",
                    "Warning:".yellow(),
                    estimate.failure_ratio * 100.0
                );
            }
        }
        Commands::Sample {
            cover_a,
            cover_b,
            count,
            seed,
        } => {
            let relations = load(&cover_a, &cover_b)?;
            let vertices = relations.vertex_set();
            let mut simulator = DeepCompleteSimulator::new(&relations, &vertices, seed)?;

            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("Module A").style_spec("bf"),
                Cell::new("Module B").style_spec("bf"),
                Cell::new("Importance").style_spec("bf"),
                Cell::new("Failed Weight").style_spec("bf"),
            ]));
            for _ in 0..count {
                let sample = simulator.sample()?;
                table.add_row(Row::new(vec![
                    Cell::new(&sample.module_a.to_string()),
                    Cell::new(&sample.module_b.to_string()),
                    Cell::new(&sample.importance.to_string()),
                    Cell::new(&sample.failed_weight.to_string()),
                ]));
            }
            table.printstd();
        }
    }

    Ok(())
}

fn load(cover_a: &Path, cover_b: &Path) -> Result<RelationPair> {
    let relations = loader::load_cover_pair(cover_a, cover_b)
        .with_context(|| format!("loading {:?} and {:?}", cover_a, cover_b))?;

    let vertices = relations.vertex_set();
    let shared = vertices
        .iter()
        .filter(|&&v| {
            !relations.first.modules_of(v).is_empty() && !relations.second.modules_of(v).is_empty()
        })
        .count();
    if shared < vertices.len() {
        eprintln!(
            "{} {} of {} vertices belong to only one cover",
            "Warning:".yellow(),
            vertices.len() - shared,
            vertices.len()
        );
    }
    Ok(relations)
}

fn print_estimate(estimate: &Estimate) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Metric").style_spec("bf"),
        Cell::new("Value").style_spec("bf"),
    ]));
    let rows = [
        (format!("NMI ({})", estimate.normalization), format!("{:.6}", estimate.nmi)),
        ("Mutual information".to_string(), format!("{:.6}", estimate.mutual_information)),
        ("Entropy A".to_string(), format!("{:.6}", estimate.entropy_a)),
        ("Entropy B".to_string(), format!("{:.6}", estimate.entropy_b)),
        ("Samples".to_string(), estimate.samples.to_string()),
        ("Distinct pairs".to_string(), estimate.distinct_pairs.to_string()),
        ("Failure ratio".to_string(), format!("{:.4}", estimate.failure_ratio)),
    ];
    for (metric, value) in &rows {
        table.add_row(Row::new(vec![Cell::new(metric), Cell::new(value)]));
    }
    table.printstd();
}
