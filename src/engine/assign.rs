//! Assignment phase: label every point with its nearest centroid.

use rayon::prelude::*;

use crate::types::{distance, Centroid, Point};

/// Assign each point to its nearest centroid, in parallel over points.
///
/// The running minimum starts from the point's current `min_distance`, which
/// is the unassigned sentinel after a reset. Ties keep the lower index.
pub fn assign_points(points: &mut [Point], centroids: &[Centroid]) {
    points
        .par_iter_mut()
        .for_each(|point| assign_point(point, centroids));
}

/// Assign a single point. Only the point's own fields are written.
#[inline]
pub fn assign_point(point: &mut Point, centroids: &[Centroid]) {
    for (i, centroid) in centroids.iter().enumerate() {
        let d = distance(point, centroid);
        if d < point.min_distance {
            point.min_distance = d;
            point.label = i;
        }
    }
}

/// Index and distance of the centroid nearest to `(x, y)`, ignoring any
/// state stored on points. Returns None when `centroids` is empty.
pub fn nearest_centroid(x: f64, y: f64, centroids: &[Centroid]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in centroids.iter().enumerate() {
        let d = crate::types::euclidean(x, y, c.x, c.y);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best
}

/// Sum of squared `min_distance` over assigned points, evaluated right after
/// an assignment phase.
pub fn assignment_inertia(points: &[Point]) -> f64 {
    let partials: Vec<f64> = points
        .par_chunks(crate::types::REDUCE_CHUNK)
        .map(|chunk| {
            chunk
                .iter()
                .filter(|p| p.min_distance.is_finite())
                .map(|p| p.min_distance * p.min_distance)
                .sum::<f64>()
        })
        .collect();
    partials.iter().sum()
}
