//! Initial centroid selection.

use rand::rngs::StdRng;
use rand::Rng;

use crate::types::{Centroid, InitStrategy, KmError, KmResult, Point};

/// Chooses the k starting centroids for a run.
pub trait CentroidInit {
    /// Produce exactly `k` centroids for `points`. `points` is never empty.
    fn init(&mut self, points: &[Point], k: usize, rng: &mut StdRng) -> KmResult<Vec<Centroid>>;
}

/// Uniform random selection of k points, with replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSample;

impl CentroidInit for RandomSample {
    fn init(&mut self, points: &[Point], k: usize, rng: &mut StdRng) -> KmResult<Vec<Centroid>> {
        Ok((0..k)
            .map(|_| Centroid::at(&points[rng.gen_range(0..points.len())]))
            .collect())
    }
}

/// Every `n / k`-th point, starting from the first. Ignores the RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenlySpaced;

impl CentroidInit for EvenlySpaced {
    fn init(&mut self, points: &[Point], k: usize, _rng: &mut StdRng) -> KmResult<Vec<Centroid>> {
        let step = (points.len() / k).max(1);
        Ok((0..k)
            .map(|i| {
                let idx = (i * step).min(points.len() - 1);
                Centroid::at(&points[idx])
            })
            .collect())
    }
}

/// Caller-supplied starting positions.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCentroids(pub Vec<Centroid>);

impl FixedCentroids {
    pub fn new(centroids: impl IntoIterator<Item = impl Into<Centroid>>) -> Self {
        Self(centroids.into_iter().map(Into::into).collect())
    }
}

impl CentroidInit for FixedCentroids {
    fn init(&mut self, _points: &[Point], k: usize, _rng: &mut StdRng) -> KmResult<Vec<Centroid>> {
        if self.0.len() != k {
            return Err(KmError::InvalidConfig(format!(
                "expected {k} initial centroids, got {}",
                self.0.len()
            )));
        }
        Ok(self.0.clone())
    }
}

/// Initializer for a configured strategy.
pub fn initializer_for(strategy: InitStrategy) -> Box<dyn CentroidInit> {
    match strategy {
        InitStrategy::Random => Box::new(RandomSample),
        InitStrategy::EvenlySpaced => Box::new(EvenlySpaced),
    }
}
