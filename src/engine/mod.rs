//! The cluster engine: a fixed-round Lloyd loop over two parallel phases.

pub mod assign;
pub mod init;
pub mod recentre;
pub mod report;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use crate::types::{now_micros, Centroid, ClusterConfig, KmError, KmResult, Point};

pub use assign::{assign_point, assign_points, assignment_inertia, nearest_centroid};
pub use init::{initializer_for, CentroidInit, EvenlySpaced, FixedCentroids, RandomSample};
pub use recentre::{
    cluster_sums, inertia, recentre, resolve_empty_clusters, ClusterSum, RecentreOutcome,
};
pub use report::{LogObserver, NoopObserver, RoundHistory, RoundObserver, RoundSnapshot};

/// Where the engine is in its round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// The next step labels points against the current centroids.
    Assigning { round: usize },
    /// The next step moves centroids to the mean of their points.
    Recentring { round: usize },
    /// All rounds have run.
    Done,
}

/// A centroid that received no points during a recentre phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyClusterEvent {
    pub round: usize,
    pub centroid: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Configuration the run used.
    pub config: ClusterConfig,
    /// Seed actually used for sampling (drawn from entropy if not configured).
    pub seed: u64,
    /// When the run started (Unix epoch microseconds).
    pub started_at: u64,
    /// Wall time spent in the round loop.
    pub elapsed_micros: u64,
    /// Number of completed rounds.
    pub rounds: usize,
    /// Final centroid positions.
    pub centroids: Vec<Centroid>,
    /// Points per centroid under the final labels.
    pub cluster_sizes: Vec<usize>,
    /// Sum of squared distances from points to their final centroid.
    pub inertia: f64,
    /// Every empty-cluster event of the run.
    pub empty_clusters: Vec<EmptyClusterEvent>,
}

/// Owns the point and centroid sets and drives the round loop.
pub struct ClusterEngine {
    points: Vec<Point>,
    centroids: Vec<Centroid>,
    config: ClusterConfig,
    phase: Phase,
    seed: u64,
    rng: StdRng,
    pool: Option<ThreadPool>,
    round_inertia: f64,
    sizes: Vec<usize>,
    round_empty: Vec<usize>,
    empty_events: Vec<EmptyClusterEvent>,
}

impl ClusterEngine {
    /// Create an engine seeded by the initializer named in `config`.
    pub fn new(points: Vec<Point>, config: ClusterConfig) -> KmResult<Self> {
        let mut init = initializer_for(config.init);
        Self::with_initializer(points, config, init.as_mut())
    }

    /// Create an engine with a caller-supplied initializer.
    ///
    /// Fails on an invalid config, fewer points than clusters, a non-finite
    /// or out-of-range point, or an initializer that does not return k
    /// finite in-range centroids.
    pub fn with_initializer<I: CentroidInit + ?Sized>(
        mut points: Vec<Point>,
        config: ClusterConfig,
        init: &mut I,
    ) -> KmResult<Self> {
        config.validate()?;
        let k = config.clusters;

        if points.len() < k {
            return Err(KmError::TooFewPoints {
                points: points.len(),
                clusters: k,
            });
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(KmError::NonFinitePoint(idx));
        }
        if let Some(idx) = points.iter().position(|p| !p.in_range()) {
            return Err(KmError::CoordinateOutOfRange(idx));
        }
        points.iter_mut().for_each(Point::reset);

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let centroids = init.init(&points, k, &mut rng)?;
        if centroids.len() != k {
            return Err(KmError::InvalidConfig(format!(
                "initializer returned {} centroids, expected {k}",
                centroids.len()
            )));
        }
        if centroids.iter().any(|c| !c.is_finite()) {
            return Err(KmError::InvalidConfig(
                "initializer returned a non-finite centroid".into(),
            ));
        }
        if centroids.iter().any(|c| !c.in_range()) {
            return Err(KmError::InvalidConfig(
                "initializer returned a centroid beyond the coordinate limit".into(),
            ));
        }

        let pool = match config.threads {
            Some(n) => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };

        log::info!(
            "Clustering {} points into {} clusters over {} rounds (seed {})",
            points.len(),
            k,
            config.iterations,
            seed
        );

        Ok(Self {
            points,
            centroids,
            config,
            phase: Phase::Assigning { round: 0 },
            seed,
            rng,
            pool,
            round_inertia: 0.0,
            sizes: vec![0; k],
            round_empty: Vec::new(),
            empty_events: Vec::new(),
        })
    }

    /// Run the phase the engine is waiting on and advance. Does nothing once
    /// the engine is done. Returns the new phase.
    pub fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Assigning { round } => {
                let Self {
                    points,
                    centroids,
                    pool,
                    ..
                } = self;
                let measured = install(pool.as_ref(), || {
                    assign_points(points, centroids);
                    assignment_inertia(points)
                });
                self.round_inertia = measured;
                self.phase = Phase::Recentring { round };
            }
            Phase::Recentring { round } => {
                let reset = self.config.reset.resets_after(
                    round,
                    self.config.iterations,
                    self.config.clusters,
                );
                let Self {
                    points,
                    centroids,
                    pool,
                    ..
                } = self;
                let outcome = install(pool.as_ref(), || recentre(points, centroids, reset));

                for &ci in &outcome.empty {
                    log::warn!(
                        "Round {}: centroid {} received no points ({})",
                        round,
                        ci,
                        self.config.empty_cluster
                    );
                    self.empty_events.push(EmptyClusterEvent {
                        round,
                        centroid: ci,
                    });
                }
                resolve_empty_clusters(
                    self.config.empty_cluster,
                    &outcome.empty,
                    &self.points,
                    &mut self.centroids,
                    &mut self.rng,
                );

                self.sizes = outcome.sizes;
                self.round_empty = outcome.empty;
                log::debug!("Round {} complete (reset: {})", round, reset);

                self.phase = if round + 1 >= self.config.iterations {
                    Phase::Done
                } else {
                    Phase::Assigning { round: round + 1 }
                };
            }
            Phase::Done => {}
        }
        self.phase
    }

    /// Run every remaining round, logging centroids after each one.
    pub fn run(&mut self) -> RunSummary {
        self.run_with(&mut LogObserver)
    }

    /// Run every remaining round, handing a snapshot to `observer` after each
    /// recentre phase.
    pub fn run_with<O: RoundObserver + ?Sized>(&mut self, observer: &mut O) -> RunSummary {
        let started_at = now_micros();
        let start = Instant::now();

        while self.phase != Phase::Done {
            let before = self.phase;
            self.step();
            if let Phase::Recentring { round } = before {
                observer.on_round(&self.snapshot(round));
            }
        }

        let elapsed_micros = start.elapsed().as_micros() as u64;
        log::info!("Clustering finished in {} us", elapsed_micros);
        self.summary(started_at, elapsed_micros)
    }

    fn snapshot(&self, round: usize) -> RoundSnapshot {
        RoundSnapshot {
            round,
            centroids: self.centroids.clone(),
            sizes: self.sizes.clone(),
            empty: self.round_empty.clone(),
            inertia: self.round_inertia,
        }
    }

    fn summary(&self, started_at: u64, elapsed_micros: u64) -> RunSummary {
        RunSummary {
            config: self.config.clone(),
            seed: self.seed,
            started_at,
            elapsed_micros,
            rounds: self.completed_rounds(),
            centroids: self.centroids.clone(),
            cluster_sizes: self.cluster_sizes(),
            inertia: self.inertia(),
            empty_clusters: self.empty_events.clone(),
        }
    }

    /// Number of rounds whose recentre phase has finished.
    pub fn completed_rounds(&self) -> usize {
        match self.phase {
            Phase::Assigning { round } | Phase::Recentring { round } => round,
            Phase::Done => self.config.iterations,
        }
    }

    /// Current phase.
    pub fn state(&self) -> Phase {
        self.phase
    }

    /// Whether every round has run.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// The point set, with labels as of the last phase.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The centroid set.
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// The run configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Seed used for sampling.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Label of every point, in input order.
    pub fn labels(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.label).collect()
    }

    /// Sum of squared distances from labelled points to their current
    /// centroid. Unlabelled points contribute nothing.
    pub fn inertia(&self) -> f64 {
        install(self.pool.as_ref(), || inertia(&self.points, &self.centroids))
    }

    /// Points per centroid under the current labels.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for p in &self.points {
            if let Some(slot) = sizes.get_mut(p.label) {
                *slot += 1;
            }
        }
        sizes
    }

    /// Every empty-cluster event so far.
    pub fn empty_cluster_events(&self) -> &[EmptyClusterEvent] {
        &self.empty_events
    }

    /// Index of the centroid nearest to `(x, y)`.
    pub fn predict(&self, x: f64, y: f64) -> Option<usize> {
        nearest_centroid(x, y, &self.centroids).map(|(i, _)| i)
    }

    /// Consume the engine, returning the labelled points.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Run `op` on `pool` if there is one, on the global rayon pool otherwise.
fn install<T: Send>(pool: Option<&ThreadPool>, op: impl FnOnce() -> T + Send) -> T {
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
