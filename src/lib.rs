//! lloyd-kmeans: parallel fixed-round k-means clustering of 2-D points.
//!
//! Points are labelled against a fixed centroid set, then every centroid
//! moves to the mean of its points, for a configured number of rounds. Both
//! phases run data-parallel on rayon with a barrier in between.

pub mod cli;
pub mod engine;
pub mod format;
pub mod types;

// Re-export commonly used types at the crate root
pub use engine::{
    assign_points, recentre, CentroidInit, ClusterEngine, EmptyClusterEvent, EvenlySpaced,
    FixedCentroids, LogObserver, NoopObserver, Phase, RandomSample, RecentreOutcome, RoundHistory,
    RoundObserver, RoundSnapshot, RunSummary,
};
pub use format::{PointReader, PointSetInfo};
pub use types::{
    distance, euclidean, load_config, now_micros, Centroid, ClusterConfig, EmptyClusterPolicy,
    InitStrategy, KmError, KmResult, Point, ResetPolicy, DEFAULT_CLUSTERS, DEFAULT_ITERATIONS,
    MAX_COORDINATE, UNASSIGNED, UNASSIGNED_DISTANCE,
};
