//! All data types for the lloyd-kmeans library.

pub mod centroid;
pub mod config;
pub mod error;
pub mod point;

pub use centroid::Centroid;
pub use config::{
    load_config, resolve_config_path, ClusterConfig, EmptyClusterPolicy, InitStrategy,
    ResetPolicy,
};
pub use error::{KmError, KmResult};
pub use point::{distance, euclidean, Point};

/// Default number of clusters.
pub const DEFAULT_CLUSTERS: usize = 8;

/// Default number of Lloyd rounds.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Label carried by a point that has not been assigned in the current round.
/// Always outside the valid range `[0, k)`.
pub const UNASSIGNED: usize = usize::MAX;

/// Distance carried by a point that has not been assigned in the current round.
pub const UNASSIGNED_DISTANCE: f64 = f64::INFINITY;

/// Largest accepted coordinate magnitude. Keeps every difference, squared
/// distance and per-cluster sum finite.
pub const MAX_COORDINATE: f64 = 1e150;

/// Points per chunk in the recentring reduction. Fixed so that the order in
/// which partial sums are combined does not depend on the worker count.
pub const REDUCE_CHUNK: usize = 4096;

/// Returns the current time as Unix epoch microseconds.
pub fn now_micros() -> u64 {
    chrono::Utc::now().timestamp_micros() as u64
}
