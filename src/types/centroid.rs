//! Cluster centres.

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::MAX_COORDINATE;

/// Position of a cluster centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centroid placed on top of an existing point.
    pub fn at(point: &Point) -> Self {
        Self::new(point.x, point.y)
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

impl From<(f64, f64)> for Centroid {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
