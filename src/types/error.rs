//! Error types for the lloyd-kmeans library.

use thiserror::Error;

use super::MAX_COORDINATE;

/// All errors that can occur in the lloyd-kmeans library.
#[derive(Error, Debug)]
pub enum KmError {
    /// A line of the point source could not be parsed.
    #[error("Malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// Fewer points than requested clusters.
    #[error("Too few points for {clusters} clusters: got {points}")]
    TooFewPoints { points: usize, clusters: usize },

    /// A point handed to the engine has a NaN or infinite coordinate.
    #[error("Point {0} has a non-finite coordinate")]
    NonFinitePoint(usize),

    /// A point handed to the engine has a coordinate beyond `MAX_COORDINATE`.
    #[error("Point {0} has a coordinate beyond ±{limit:e}", limit = MAX_COORDINATE)]
    CoordinateOutOfRange(usize),

    /// Configuration value out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for lloyd-kmeans operations.
pub type KmResult<T> = Result<T, KmError>;
