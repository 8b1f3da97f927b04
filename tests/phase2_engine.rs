//! Phase 2 tests: Assignment and recentre phases, the engine state machine.

use rand::rngs::StdRng;
use rand::SeedableRng;

use lloyd_kmeans::engine::{
    assign_point, assign_points, cluster_sums, inertia, recentre, resolve_empty_clusters,
    CentroidInit, ClusterEngine, EvenlySpaced, FixedCentroids, Phase, RandomSample, RoundHistory,
};
use lloyd_kmeans::types::{
    Centroid, ClusterConfig, EmptyClusterPolicy, InitStrategy, KmError, Point, ResetPolicy,
    MAX_COORDINATE, UNASSIGNED,
};

// ==================== Helpers ====================

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&c| Point::from(c)).collect()
}

fn cents(coords: &[(f64, f64)]) -> Vec<Centroid> {
    coords.iter().map(|&c| Centroid::from(c)).collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Four points forming two vertical pairs ten units apart.
fn two_pairs() -> Vec<Point> {
    pts(&[(0.0, 0.0), (0.0, 1.0), (10.0, 0.0), (10.0, 1.0)])
}

/// Two tight squares, one near the origin and one near (10, 10).
fn two_squares() -> Vec<Point> {
    pts(&[
        (0.0, 0.0),
        (0.0, 1.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (10.0, 10.0),
        (10.0, 11.0),
        (11.0, 10.0),
        (11.0, 11.0),
    ])
}

fn fixed_engine(points: Vec<Point>, config: ClusterConfig, init: &[(f64, f64)]) -> ClusterEngine {
    let mut init = FixedCentroids::new(init.iter().copied());
    ClusterEngine::with_initializer(points, config, &mut init).unwrap()
}

// ==================== Assignment Tests ====================

#[test]
fn test_assign_nearest_centroid() {
    let mut points = two_pairs();
    let centroids = cents(&[(0.0, 0.0), (10.0, 0.0)]);
    assign_points(&mut points, &centroids);

    let labels: Vec<usize> = points.iter().map(|p| p.label).collect();
    assert_eq!(labels, vec![0, 0, 1, 1]);
    assert_eq!(points[0].min_distance, 0.0);
    assert_eq!(points[1].min_distance, 1.0);
    assert_eq!(points[2].min_distance, 0.0);
    assert_eq!(points[3].min_distance, 1.0);
}

#[test]
fn test_assign_tie_keeps_lower_index() {
    let mut p = Point::new(5.0, 0.0);
    assign_point(&mut p, &cents(&[(0.0, 0.0), (10.0, 0.0)]));
    assert_eq!(p.label, 0);
    assert_eq!(p.min_distance, 5.0);

    let mut p = Point::new(5.0, 0.0);
    assign_point(&mut p, &cents(&[(10.0, 0.0), (0.0, 0.0)]));
    assert_eq!(p.label, 0);

    let mut p = Point::new(1.0, 1.0);
    assign_point(&mut p, &cents(&[(9.0, 9.0), (1.0, 1.0), (1.0, 1.0)]));
    assert_eq!(p.label, 1);
    assert_eq!(p.min_distance, 0.0);
}

#[test]
fn test_assign_is_idempotent() {
    let mut points = two_squares();
    let centroids = cents(&[(0.5, 0.5), (3.0, 3.0), (10.0, 10.0)]);
    assign_points(&mut points, &centroids);
    let first = points.clone();
    assign_points(&mut points, &centroids);
    assert_eq!(points, first);
}

#[test]
fn test_assign_from_stale_state_keeps_smaller_distance() {
    let mut p = Point::new(0.0, 0.0);
    p.label = 1;
    p.min_distance = 0.5;
    assign_point(&mut p, &cents(&[(2.0, 0.0), (3.0, 0.0)]));
    assert_eq!(p.label, 1);
    assert_eq!(p.min_distance, 0.5);
}

// ==================== Recentre Tests ====================

#[test]
fn test_cluster_sums() {
    let mut points = two_pairs();
    assign_points(&mut points, &cents(&[(0.0, 0.0), (10.0, 0.0)]));
    let sums = cluster_sums(&points, 2);
    assert_eq!(sums[0].count, 2);
    assert_eq!(sums[1].count, 2);
    assert_eq!(sums[0].mean(), Some((0.0, 0.5)));
    assert_eq!(sums[1].mean(), Some((10.0, 0.5)));
}

#[test]
fn test_cluster_sums_skip_unassigned() {
    let points = two_pairs();
    let sums = cluster_sums(&points, 2);
    assert!(sums.iter().all(|s| s.count == 0));
    assert!(sums.iter().all(|s| s.mean().is_none()));
}

#[test]
fn test_recentre_moves_to_mean_and_resets() {
    let mut points = two_pairs();
    let mut centroids = cents(&[(0.0, 0.0), (10.0, 0.0)]);
    assign_points(&mut points, &centroids);

    let outcome = recentre(&mut points, &mut centroids, true);
    assert_eq!(centroids, cents(&[(0.0, 0.5), (10.0, 0.5)]));
    assert_eq!(outcome.sizes, vec![2, 2]);
    assert!(outcome.empty.is_empty());
    assert!(outcome.reset);
    assert!(points.iter().all(|p| p.label == UNASSIGNED));
    assert!(points.iter().all(|p| p.min_distance.is_infinite()));
}

#[test]
fn test_recentre_without_reset_keeps_labels() {
    let mut points = two_pairs();
    let mut centroids = cents(&[(0.0, 0.0), (10.0, 0.0)]);
    assign_points(&mut points, &centroids);

    let outcome = recentre(&mut points, &mut centroids, false);
    assert!(!outcome.reset);
    let labels: Vec<usize> = points.iter().map(|p| p.label).collect();
    assert_eq!(labels, vec![0, 0, 1, 1]);
}

#[test]
fn test_recentre_empty_cluster_retains_position() {
    let mut points = two_squares();
    let mut centroids = cents(&[(0.0, 0.0), (10.0, 10.0), (100.0, 100.0)]);
    assign_points(&mut points, &centroids);

    let outcome = recentre(&mut points, &mut centroids, true);
    assert_eq!(outcome.sizes, vec![4, 4, 0]);
    assert_eq!(outcome.empty, vec![2]);
    assert_eq!(centroids[2], Centroid::new(100.0, 100.0));
    assert!(centroids.iter().all(|c| c.is_finite()));
}

#[test]
fn test_resolve_empty_resample_picks_input_point() {
    let points = two_squares();
    let mut centroids = cents(&[(0.5, 0.5), (10.5, 10.5), (100.0, 100.0)]);
    let mut rng = StdRng::seed_from_u64(3);
    resolve_empty_clusters(
        EmptyClusterPolicy::Resample,
        &[2],
        &points,
        &mut centroids,
        &mut rng,
    );
    assert!(points.iter().any(|p| Centroid::at(p) == centroids[2]));
    assert_eq!(centroids[0], Centroid::new(0.5, 0.5));

    let mut retained = cents(&[(0.5, 0.5), (10.5, 10.5), (100.0, 100.0)]);
    resolve_empty_clusters(
        EmptyClusterPolicy::Retain,
        &[2],
        &points,
        &mut retained,
        &mut rng,
    );
    assert_eq!(retained[2], Centroid::new(100.0, 100.0));
}

#[test]
fn test_inertia_ignores_unassigned() {
    let mut points = two_pairs();
    let centroids = cents(&[(0.0, 0.5), (10.0, 0.5)]);
    assert_eq!(inertia(&points, &centroids), 0.0);
    assign_points(&mut points, &centroids);
    assert!(approx(inertia(&points, &centroids), 1.0));
}

// ==================== Initializer Tests ====================

#[test]
fn test_random_sample_picks_input_points() {
    let points = two_squares();
    let mut rng = StdRng::seed_from_u64(11);
    let centroids = RandomSample.init(&points, 5, &mut rng).unwrap();
    assert_eq!(centroids.len(), 5);
    for c in &centroids {
        assert!(points.iter().any(|p| Centroid::at(p) == *c));
    }

    let mut rng_a = StdRng::seed_from_u64(11);
    let mut rng_b = StdRng::seed_from_u64(11);
    assert_eq!(
        RandomSample.init(&points, 5, &mut rng_a).unwrap(),
        RandomSample.init(&points, 5, &mut rng_b).unwrap()
    );
}

#[test]
fn test_evenly_spaced() {
    let points = two_squares();
    let mut rng = StdRng::seed_from_u64(0);
    let centroids = EvenlySpaced.init(&points, 4, &mut rng).unwrap();
    assert_eq!(
        centroids,
        cents(&[(0.0, 0.0), (1.0, 0.0), (10.0, 10.0), (11.0, 10.0)])
    );
}

#[test]
fn test_fixed_centroids_count_mismatch() {
    let mut init = FixedCentroids::new([(0.0, 0.0)]);
    let result = ClusterEngine::with_initializer(two_pairs(), ClusterConfig::new(2, 2), &mut init);
    assert!(matches!(result, Err(KmError::InvalidConfig(_))));
}

#[test]
fn test_non_finite_initial_centroid_rejected() {
    let mut init = FixedCentroids::new([(0.0, 0.0), (f64::NAN, 0.0)]);
    let result = ClusterEngine::with_initializer(two_pairs(), ClusterConfig::new(2, 2), &mut init);
    assert!(matches!(result, Err(KmError::InvalidConfig(_))));
}

// ==================== Engine Validation Tests ====================

#[test]
fn test_engine_too_few_points() {
    let result = ClusterEngine::new(two_pairs(), ClusterConfig::new(5, 10).seed(1));
    match result {
        Err(KmError::TooFewPoints { points, clusters }) => {
            assert_eq!(points, 4);
            assert_eq!(clusters, 5);
        }
        Err(e) => panic!("expected TooFewPoints, got {:?}", e),
        Ok(_) => panic!("expected TooFewPoints"),
    }
    assert!(matches!(
        ClusterEngine::new(Vec::new(), ClusterConfig::new(1, 1)),
        Err(KmError::TooFewPoints { .. })
    ));
}

#[test]
fn test_engine_rejects_non_finite_point() {
    let mut points = two_pairs();
    points[2].y = f64::INFINITY;
    assert!(matches!(
        ClusterEngine::new(points, ClusterConfig::new(2, 2).seed(1)),
        Err(KmError::NonFinitePoint(2))
    ));
}

#[test]
fn test_engine_rejects_out_of_range_point() {
    let points = pts(&[(-1e200, 0.0), (1e200, 0.0)]);
    assert!(matches!(
        ClusterEngine::new(points, ClusterConfig::new(1, 1).seed(1)),
        Err(KmError::CoordinateOutOfRange(0))
    ));

    let points = pts(&[(0.0, 0.0), (1e308, 0.0), (1e308, 1.0)]);
    assert!(matches!(
        ClusterEngine::new(points, ClusterConfig::new(1, 2).seed(1)),
        Err(KmError::CoordinateOutOfRange(1))
    ));
}

#[test]
fn test_out_of_range_initial_centroid_rejected() {
    let mut init = FixedCentroids::new([(0.0, 0.0), (1e200, 0.0)]);
    let result = ClusterEngine::with_initializer(two_pairs(), ClusterConfig::new(2, 2), &mut init);
    assert!(matches!(result, Err(KmError::InvalidConfig(_))));
}

#[test]
fn test_opposite_extremes_are_assigned() {
    let max = MAX_COORDINATE;
    let mut engine = fixed_engine(
        pts(&[(-max, 0.0), (max, 0.0)]),
        ClusterConfig::new(1, 1),
        &[(-max, 0.0)],
    );
    engine.step();
    assert_eq!(engine.labels(), vec![0, 0]);
    assert_eq!(engine.points()[0].min_distance, 0.0);
    assert_eq!(engine.points()[1].min_distance, 2.0 * max);

    let summary = engine.run();
    assert_eq!(summary.centroids, vec![Centroid::new(0.0, 0.0)]);
    assert!(summary.inertia.is_finite());
}

#[test]
fn test_same_sign_extremes_keep_finite_centroid() {
    let max = MAX_COORDINATE;
    let mut engine = fixed_engine(
        pts(&[(max, 0.0), (max, 1.0)]),
        ClusterConfig::new(1, 2),
        &[(max, 0.0)],
    );
    let summary = engine.run();
    assert_eq!(summary.centroids, vec![Centroid::new(max, 0.5)]);
    assert!(summary.centroids.iter().all(|c| c.is_finite()));
    assert_eq!(engine.labels(), vec![0, 0]);
}

#[test]
fn test_engine_rejects_invalid_config() {
    assert!(matches!(
        ClusterEngine::new(two_pairs(), ClusterConfig::new(0, 2)),
        Err(KmError::InvalidConfig(_))
    ));
    assert!(matches!(
        ClusterEngine::new(two_pairs(), ClusterConfig::new(2, 0)),
        Err(KmError::InvalidConfig(_))
    ));
}

#[test]
fn test_engine_clears_incoming_labels() {
    let mut points = two_pairs();
    points[0].label = 1;
    points[0].min_distance = 0.0;
    let engine = fixed_engine(points, ClusterConfig::new(2, 2), &[(0.0, 0.0), (10.0, 0.0)]);
    assert!(engine.points().iter().all(|p| p.label == UNASSIGNED));
}

#[test]
fn test_engine_k_equals_n() {
    let points = pts(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
    let mut engine = ClusterEngine::new(
        points,
        ClusterConfig::new(3, 4).init(InitStrategy::EvenlySpaced),
    )
    .unwrap();
    let summary = engine.run();
    assert_eq!(engine.labels(), vec![0, 1, 2]);
    assert_eq!(summary.cluster_sizes, vec![1, 1, 1]);
    assert!(summary.inertia < 1e-12);
}

// ==================== State Machine Tests ====================

#[test]
fn test_state_transitions() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 3),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    assert_eq!(engine.state(), Phase::Assigning { round: 0 });
    assert_eq!(engine.step(), Phase::Recentring { round: 0 });
    assert_eq!(engine.step(), Phase::Assigning { round: 1 });
    assert_eq!(engine.step(), Phase::Recentring { round: 1 });
    assert_eq!(engine.step(), Phase::Assigning { round: 2 });
    assert_eq!(engine.completed_rounds(), 2);
    assert_eq!(engine.step(), Phase::Recentring { round: 2 });
    assert_eq!(engine.step(), Phase::Done);
    assert!(engine.is_done());
    assert_eq!(engine.completed_rounds(), 3);

    // Stepping a finished engine changes nothing.
    let centroids = engine.centroids().to_vec();
    let labels = engine.labels();
    assert_eq!(engine.step(), Phase::Done);
    assert_eq!(engine.centroids(), centroids.as_slice());
    assert_eq!(engine.labels(), labels);
}

#[test]
fn test_single_round_goes_straight_to_done() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 1),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    engine.step();
    assert_eq!(engine.step(), Phase::Done);
    assert_eq!(engine.labels(), vec![0, 0, 1, 1]);
}

#[test]
fn test_labels_valid_after_every_assignment() {
    let mut engine = fixed_engine(
        two_squares(),
        ClusterConfig::new(3, 5),
        &[(0.0, 0.0), (1.0, 1.0), (10.0, 10.0)],
    );
    while !engine.is_done() {
        let phase = engine.step();
        if let Phase::Recentring { .. } = phase {
            for p in engine.points() {
                assert!(p.label < 3);
                assert!(p.min_distance >= 0.0);
                let nearest = engine
                    .centroids()
                    .iter()
                    .map(|c| lloyd_kmeans::distance(p, c))
                    .fold(f64::INFINITY, f64::min);
                assert_eq!(p.min_distance, nearest);
            }
        }
    }
}

#[test]
fn test_points_reset_between_rounds_but_not_after_last() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 2),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    engine.step();
    engine.step();
    assert_eq!(engine.state(), Phase::Assigning { round: 1 });
    assert!(engine.points().iter().all(|p| p.label == UNASSIGNED));

    engine.step();
    engine.step();
    assert!(engine.is_done());
    assert_eq!(engine.labels(), vec![0, 0, 1, 1]);
}

// ==================== Scenario Tests ====================

#[test]
fn test_two_pair_scenario() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 2),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    let summary = engine.run();

    let c = engine.centroids();
    assert!(approx(c[0].x, 0.0) && approx(c[0].y, 0.5));
    assert!(approx(c[1].x, 10.0) && approx(c[1].y, 0.5));
    assert_eq!(engine.labels(), vec![0, 0, 1, 1]);
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.cluster_sizes, vec![2, 2]);
    assert!(approx(summary.inertia, 1.0));
    assert!(summary.empty_clusters.is_empty());
}

#[test]
fn test_empty_cluster_retain_scenario() {
    let mut engine = fixed_engine(
        two_squares(),
        ClusterConfig::new(3, 3).empty_cluster(EmptyClusterPolicy::Retain),
        &[(0.0, 0.0), (10.0, 10.0), (100.0, 100.0)],
    );
    let mut history = RoundHistory::new();
    let summary = engine.run_with(&mut history);

    let c = engine.centroids();
    assert_eq!(c[0], Centroid::new(0.5, 0.5));
    assert_eq!(c[1], Centroid::new(10.5, 10.5));
    assert_eq!(c[2], Centroid::new(100.0, 100.0));
    assert!(c.iter().all(|c| c.is_finite()));

    assert_eq!(summary.cluster_sizes, vec![4, 4, 0]);
    assert_eq!(summary.empty_clusters.len(), 3);
    for (round, event) in summary.empty_clusters.iter().enumerate() {
        assert_eq!(event.round, round);
        assert_eq!(event.centroid, 2);
    }
    assert!(approx(summary.inertia, 4.0));
    assert_eq!(history.rounds.len(), 3);
    assert!(history.rounds.iter().all(|r| r.empty == vec![2]));
}

#[test]
fn test_empty_cluster_resample_scenario() {
    let run = || {
        let mut engine = fixed_engine(
            two_squares(),
            ClusterConfig::new(3, 3)
                .seed(99)
                .empty_cluster(EmptyClusterPolicy::Resample),
            &[(0.0, 0.0), (10.0, 10.0), (100.0, 100.0)],
        );
        engine.step();
        engine.step();
        let after_first = engine.centroids()[2];
        let summary = engine.run();
        (after_first, summary, engine.centroids().to_vec())
    };

    let (after_first, summary, centroids) = run();
    let inputs = two_squares();
    assert!(inputs.iter().any(|p| Centroid::at(p) == after_first));
    assert_eq!(summary.empty_clusters[0].round, 0);
    assert_eq!(summary.empty_clusters[0].centroid, 2);
    assert!(centroids.iter().all(|c| c.is_finite()));
    assert!(summary.inertia.is_finite());

    let (again_first, _, again) = run();
    assert_eq!(after_first, again_first);
    assert_eq!(centroids, again);
}

#[test]
fn test_reset_policy_changes_late_rounds() {
    let points = pts(&[(0.0, 0.0), (2.0, 0.0), (3.0, 0.0), (10.0, 0.0)]);
    let init = [(0.0, 0.0), (2.0, 0.0)];

    let mut legacy = fixed_engine(
        points.clone(),
        ClusterConfig::new(2, 3).reset(ResetPolicy::UntilClusterCount),
        &init,
    );
    legacy.run();
    assert_eq!(legacy.labels(), vec![0, 0, 1, 1]);
    assert_eq!(
        legacy.centroids(),
        cents(&[(1.0, 0.0), (6.5, 0.0)]).as_slice()
    );

    let mut fresh = fixed_engine(points, ClusterConfig::new(2, 3), &init);
    fresh.run();
    assert_eq!(fresh.labels(), vec![0, 0, 0, 1]);
    let c = fresh.centroids();
    assert!(approx(c[0].x, 5.0 / 3.0) && approx(c[0].y, 0.0));
    assert_eq!(c[1], Centroid::new(10.0, 0.0));
}

#[test]
fn test_legacy_reset_keeps_labels_after_cutoff() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 4).reset(ResetPolicy::UntilClusterCount),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    // Round 0 resets (0 < k - 1).
    engine.step();
    engine.step();
    assert!(engine.points().iter().all(|p| p.label == UNASSIGNED));
    // Round 1 does not, although two rounds remain.
    engine.step();
    engine.step();
    assert_eq!(engine.state(), Phase::Assigning { round: 2 });
    assert_eq!(engine.labels(), vec![0, 0, 1, 1]);
}

#[test]
fn test_legacy_reset_skips_terminal_round_with_few_iterations() {
    let mut engine = fixed_engine(
        two_squares(),
        ClusterConfig::new(3, 2).reset(ResetPolicy::UntilClusterCount),
        &[(0.0, 0.0), (10.0, 10.0), (100.0, 100.0)],
    );
    engine.run();
    assert_eq!(engine.labels(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    assert!(engine.points().iter().all(|p| p.min_distance.is_finite()));
}

#[test]
fn test_predict() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 2),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    engine.run();
    assert_eq!(engine.predict(-1.0, 0.0), Some(0));
    assert_eq!(engine.predict(9.0, 3.0), Some(1));
}

#[test]
fn test_dedicated_thread_pool() {
    let mut engine = fixed_engine(
        two_pairs(),
        ClusterConfig::new(2, 2).threads(2),
        &[(0.0, 0.0), (10.0, 0.0)],
    );
    engine.run();
    assert_eq!(engine.labels(), vec![0, 0, 1, 1]);
}

#[test]
fn test_seed_recorded_when_not_configured() {
    let engine = ClusterEngine::new(two_squares(), ClusterConfig::new(2, 2)).unwrap();
    let seed = engine.seed();
    let replay = ClusterEngine::new(two_squares(), ClusterConfig::new(2, 2).seed(seed)).unwrap();
    assert_eq!(engine.centroids(), replay.centroids());
}
