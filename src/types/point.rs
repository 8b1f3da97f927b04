//! Points and the distance function.

use serde::Serialize;

use super::centroid::Centroid;
use super::{MAX_COORDINATE, UNASSIGNED, UNASSIGNED_DISTANCE};

/// A single 2-D observation together with its current cluster assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Index of the nearest centroid, or [`UNASSIGNED`].
    pub label: usize,
    /// Distance to the centroid at `label`, or [`UNASSIGNED_DISTANCE`].
    pub min_distance: f64,
}

impl Point {
    /// Create an unassigned point.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: UNASSIGNED,
            min_distance: UNASSIGNED_DISTANCE,
        }
    }

    /// Whether the point currently carries a label below `k`.
    pub fn is_assigned(&self, k: usize) -> bool {
        self.label < k
    }

    /// Clear the label and distance back to their sentinels.
    pub fn reset(&mut self) {
        self.label = UNASSIGNED;
        self.min_distance = UNASSIGNED_DISTANCE;
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether both coordinates lie within `±MAX_COORDINATE`.
    pub fn in_range(&self) -> bool {
        self.x.abs() <= MAX_COORDINATE && self.y.abs() <= MAX_COORDINATE
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Euclidean distance between two positions.
#[inline]
pub fn euclidean(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (ax - bx).hypot(ay - by)
}

/// Euclidean distance between a point and a centroid.
#[inline]
pub fn distance(point: &Point, centroid: &Centroid) -> f64 {
    euclidean(point.x, point.y, centroid.x, centroid.y)
}
