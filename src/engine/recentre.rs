//! Recentre phase: move every centroid to the mean of its points.
//!
//! Points are reduced in fixed-size chunks. Each chunk produces its own
//! table of per-cluster sums, and the tables are combined in chunk order
//! after the parallel region, so no worker ever writes a shared accumulator
//! and the floating-point result does not depend on the worker count.

use rand::Rng;
use rayon::prelude::*;

use crate::types::{distance, Centroid, EmptyClusterPolicy, Point, REDUCE_CHUNK};

/// Running count and coordinate sums for one cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterSum {
    pub count: usize,
    pub sum_x: f64,
    pub sum_y: f64,
}

impl ClusterSum {
    #[inline]
    fn add(&mut self, point: &Point) {
        self.count += 1;
        self.sum_x += point.x;
        self.sum_y += point.y;
    }

    #[inline]
    fn merge(&mut self, other: &ClusterSum) {
        self.count += other.count;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
    }

    /// Mean position, or None for an empty cluster.
    pub fn mean(&self) -> Option<(f64, f64)> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some((self.sum_x / n, self.sum_y / n))
    }
}

/// Outcome of one recentre phase.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentreOutcome {
    /// Number of points labelled with each centroid.
    pub sizes: Vec<usize>,
    /// Indices of centroids that received no points.
    pub empty: Vec<usize>,
    /// Whether point labels were cleared afterwards.
    pub reset: bool,
}

/// Per-cluster sums over all labelled points. Unassigned points are skipped.
pub fn cluster_sums(points: &[Point], k: usize) -> Vec<ClusterSum> {
    let partials: Vec<Vec<ClusterSum>> = points
        .par_chunks(REDUCE_CHUNK)
        .map(|chunk| {
            let mut local = vec![ClusterSum::default(); k];
            for point in chunk {
                if point.label < k {
                    local[point.label].add(point);
                }
            }
            local
        })
        .collect();

    let mut totals = vec![ClusterSum::default(); k];
    for partial in &partials {
        for (total, part) in totals.iter_mut().zip(partial) {
            total.merge(part);
        }
    }
    totals
}

/// Recompute centroid positions from the current labels.
///
/// Empty clusters are left where they are; callers apply their
/// [`EmptyClusterPolicy`] through [`resolve_empty_clusters`]. When `reset`
/// is set, every labelled point is returned to the unassigned state.
pub fn recentre(points: &mut [Point], centroids: &mut [Centroid], reset: bool) -> RecentreOutcome {
    let k = centroids.len();
    let sums = cluster_sums(points, k);

    centroids
        .par_iter_mut()
        .zip(sums.par_iter())
        .for_each(|(centroid, sum)| {
            if let Some((x, y)) = sum.mean() {
                centroid.x = x;
                centroid.y = y;
            }
        });

    if reset {
        points
            .par_iter_mut()
            .filter(|p| p.label < k)
            .for_each(Point::reset);
    }

    let empty = sums
        .iter()
        .enumerate()
        .filter(|(_, s)| s.count == 0)
        .map(|(i, _)| i)
        .collect();

    RecentreOutcome {
        sizes: sums.iter().map(|s| s.count).collect(),
        empty,
        reset,
    }
}

/// Apply `policy` to the centroids listed in `empty`.
///
/// `Resample` draws indices from `rng` in the order of `empty`, so a seeded
/// generator gives the same positions on every run.
pub fn resolve_empty_clusters<R: Rng>(
    policy: EmptyClusterPolicy,
    empty: &[usize],
    points: &[Point],
    centroids: &mut [Centroid],
    rng: &mut R,
) {
    match policy {
        EmptyClusterPolicy::Retain => {}
        EmptyClusterPolicy::Resample => {
            if points.is_empty() {
                return;
            }
            for &ci in empty {
                let pick = rng.gen_range(0..points.len());
                centroids[ci] = Centroid::at(&points[pick]);
            }
        }
    }
}

/// Sum of squared distances from each labelled point to its centroid.
pub fn inertia(points: &[Point], centroids: &[Centroid]) -> f64 {
    let k = centroids.len();
    let partials: Vec<f64> = points
        .par_chunks(REDUCE_CHUNK)
        .map(|chunk| {
            chunk
                .iter()
                .filter(|p| p.label < k)
                .map(|p| {
                    let d = distance(p, &centroids[p.label]);
                    d * d
                })
                .sum::<f64>()
        })
        .collect();
    partials.iter().sum()
}
