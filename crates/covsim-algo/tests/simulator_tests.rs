// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use covsim_algo::{BipartiteRelation, DeepCompleteSimulator, MAX_ATTEMPTS, RelationPair, Sample};
use covsim_common::{CovsimError, ModuleId, VertexId};
use std::collections::HashSet;

fn relation(modules: &[(ModuleId, &[VertexId])]) -> BipartiteRelation {
    BipartiteRelation::from_modules(
        modules
            .iter()
            .map(|&(module, members)| (module, members.iter().copied())),
    )
}

fn draw(sim: &mut DeepCompleteSimulator<'_>, count: usize) -> Vec<Sample> {
    (0..count).map(|_| sim.sample().unwrap()).collect()
}

/// Two crossing partitions of four vertices.
fn crossing_partitions() -> RelationPair {
    RelationPair::new(
        relation(&[(10, &[0, 1]), (11, &[2, 3])]),
        relation(&[(20, &[0, 2]), (21, &[1, 3])]),
    )
}

#[test]
fn test_crossing_partitions_yield_valid_pairs() {
    let relations = crossing_partitions();
    let vertices: Vec<VertexId> = vec![0, 1, 2, 3];
    let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(42)).unwrap();

    let allowed: HashSet<(ModuleId, ModuleId)> =
        [(10, 20), (10, 21), (11, 20), (11, 21)].into_iter().collect();

    for sample in draw(&mut sim, 100) {
        assert!(allowed.contains(&sample.pair()), "unexpected {sample:?}");
        assert_eq!(sample.importance, 1.0);
        assert_eq!(sample.failed_weight, 0.0);
    }
}

#[test]
fn test_partition_against_ring_cover_converges() {
    // Every vertex has one module in the partition and two in the ring, so
    // the partition side starts out converged while the ring side does not.
    let relations = RelationPair::new(
        relation(&[(10, &[0, 1]), (11, &[2, 3])]),
        relation(&[(20, &[0, 1]), (21, &[1, 2]), (22, &[2, 3]), (23, &[3, 0])]),
    );
    let vertices = relations.vertex_set();

    for seed in 0..6 {
        let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(seed)).unwrap();
        for _ in 0..20 {
            let sample = sim
                .sample()
                .unwrap_or_else(|e| panic!("seed {seed} did not converge: {e}"));
            assert!(relations.first.modules().contains(&sample.module_a));
            assert!(relations.second.modules().contains(&sample.module_b));
            assert_eq!(sample.importance, 1.0);
        }
    }
}

#[test]
fn test_unsolvable_pair_fails_after_attempt_budget() {
    // Vertex 1 has no module in the second clustering, and vertex 0 sits in
    // two identical first-clustering modules, so no walk can ever narrow.
    let relations = RelationPair::new(
        relation(&[(10, &[0, 1]), (11, &[0, 1])]),
        relation(&[(20, &[0]), (21, &[0])]),
    );
    let vertices: Vec<VertexId> = vec![0, 1];
    let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(7)).unwrap();

    match sim.sample() {
        Err(CovsimError::NonConvergence {
            attempts,
            failed_weight,
        }) => {
            assert_eq!(attempts, MAX_ATTEMPTS);
            assert_eq!(failed_weight, MAX_ATTEMPTS as f64);
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
}

#[test]
fn test_failed_attempts_are_weighted() {
    // Vertex 1 is unknown to the second clustering: every walk started there
    // fails, every walk started at vertex 0 converges immediately.
    let relations = RelationPair::new(
        relation(&[(10, &[0]), (11, &[1])]),
        relation(&[(20, &[0])]),
    );
    let vertices: Vec<VertexId> = vec![0, 1];
    let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(1)).unwrap();

    let samples = draw(&mut sim, 200);
    assert!(samples.iter().all(|s| s.pair() == (10, 20)));
    assert!(
        samples
            .iter()
            .all(|s| s.failed_weight >= 0.0 && s.failed_weight.fract() == 0.0)
    );
    // Half the start vertices are dead ends.
    assert!(samples.iter().any(|s| s.failed_weight > 0.0));
}

#[test]
fn test_singleton_modules_resolve() {
    // Vertex 0 is alone in modules 10 and 20 and shares 11/21 with vertex 1.
    let relations = RelationPair::new(
        relation(&[(10, &[0]), (11, &[0, 1])]),
        relation(&[(20, &[0]), (21, &[0, 1])]),
    );
    let vertices = relations.vertex_set();
    let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(2024)).unwrap();

    let pairs: HashSet<_> = draw(&mut sim, 300).iter().map(Sample::pair).collect();
    assert!(pairs.iter().all(|p| *p == (10, 20) || *p == (11, 21)), "{pairs:?}");
    assert!(pairs.contains(&(10, 20)));
    assert!(pairs.contains(&(11, 21)));
}

#[test]
fn test_one_based_input_skips_vertex_zero() {
    let relations = RelationPair::new(relation(&[(10, &[1])]), relation(&[(20, &[1])]));
    let vertices: Vec<VertexId> = vec![0];
    let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(3)).unwrap();

    let sample = sim.sample().unwrap();
    assert_eq!(sample.pair(), (10, 20));
    assert_eq!(sample.failed_weight, 0.0);
}

#[test]
fn test_same_seed_same_sequence() {
    let relations = RelationPair::new(
        relation(&[(10, &[0]), (11, &[0, 1, 2]), (12, &[2, 3])]),
        relation(&[(20, &[0, 1]), (21, &[1, 2, 3]), (22, &[3])]),
    );
    let vertices = relations.vertex_set();

    let run = |seed| {
        let mut sim = DeepCompleteSimulator::new(&relations, &vertices, Some(seed)).unwrap();
        (0..100).map(|_| sim.sample().ok()).collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_seeded_forks_are_reproducible() {
    let relations = crossing_partitions();
    let vertices = relations.vertex_set();
    let parent = DeepCompleteSimulator::new(&relations, &vertices, None).unwrap();

    let mut left = parent.fork_seeded(5);
    let mut right = parent.fork_seeded(5);
    assert_eq!(left.vertices_count(), parent.vertices_count());
    assert_eq!(draw(&mut left, 50), draw(&mut right, 50));
}

#[test]
fn test_forks_sample_on_separate_threads() {
    let relations = crossing_partitions();
    let vertices = relations.vertex_set();
    let parent = DeepCompleteSimulator::new(&relations, &vertices, Some(8)).unwrap();

    let forks: Vec<_> = (0..4).map(|i| parent.fork_seeded(i)).collect();
    let results: Vec<Vec<Sample>> = std::thread::scope(|scope| {
        let handles: Vec<_> = forks
            .into_iter()
            .map(|mut sim| scope.spawn(move || draw(&mut sim, 25)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 4);
    for samples in results {
        assert_eq!(samples.len(), 25);
        assert!(samples.iter().all(|s| relations.first.members_of(s.module_a).len() == 2));
    }

    let mut entropy_fork = parent.fork();
    assert_eq!(entropy_fork.vertices_count(), 4);
    assert!(entropy_fork.sample().is_ok());
}
