//! Run configuration and the policy enums it selects between.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{KmError, KmResult};
use super::{DEFAULT_CLUSTERS, DEFAULT_ITERATIONS};

/// How the initial centroid set is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitStrategy {
    /// Uniform random selection of k points, with replacement.
    #[default]
    Random,
    /// Every `n / k`-th point, starting from the first.
    EvenlySpaced,
}

impl InitStrategy {
    /// Return a human-readable name for this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::EvenlySpaced => "evenly-spaced",
        }
    }

    /// Parse a strategy from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "random" => Some(Self::Random),
            "evenly-spaced" | "even" => Some(Self::EvenlySpaced),
            _ => None,
        }
    }
}

impl std::fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What happens to a centroid that received no points in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyClusterPolicy {
    /// Keep the centroid at its previous position.
    #[default]
    Retain,
    /// Move the centroid onto a point drawn from the engine's seeded RNG.
    Resample,
}

impl EmptyClusterPolicy {
    /// Return a human-readable name for this policy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Resample => "resample",
        }
    }

    /// Parse a policy from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "retain" => Some(Self::Retain),
            "resample" => Some(Self::Resample),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmptyClusterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// When the recentring phase clears point labels for the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Reset after every round except the last one.
    #[default]
    UntilFinalRound,
    /// Reset only while `round < clusters - 1`. Later rounds assign against
    /// the label and distance left over from the last reset round. The
    /// terminal round still never resets, even when `iterations < clusters`.
    UntilClusterCount,
}

impl ResetPolicy {
    /// Return a human-readable name for this policy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UntilFinalRound => "until-final-round",
            Self::UntilClusterCount => "until-cluster-count",
        }
    }

    /// Parse a policy from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "until-final-round" | "final" => Some(Self::UntilFinalRound),
            "until-cluster-count" | "legacy" => Some(Self::UntilClusterCount),
            _ => None,
        }
    }

    /// Whether points are reset at the end of `round`.
    ///
    /// The terminal round never resets, whatever the policy.
    pub fn resets_after(&self, round: usize, iterations: usize, clusters: usize) -> bool {
        if round + 1 >= iterations {
            return false;
        }
        match self {
            Self::UntilFinalRound => true,
            Self::UntilClusterCount => round + 1 < clusters,
        }
    }
}

impl std::fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Validated parameters of a clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters (k).
    pub clusters: usize,
    /// Number of assignment/recentre rounds.
    pub iterations: usize,
    /// Seed for centroid sampling. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Initial centroid policy.
    pub init: InitStrategy,
    /// Empty-cluster policy.
    pub empty_cluster: EmptyClusterPolicy,
    /// Point reset policy.
    pub reset: ResetPolicy,
    /// Worker threads. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            init: InitStrategy::default(),
            empty_cluster: EmptyClusterPolicy::default(),
            reset: ResetPolicy::default(),
            threads: None,
        }
    }
}

impl ClusterConfig {
    /// Config with the given k and round count, defaults elsewhere.
    pub fn new(clusters: usize, iterations: usize) -> Self {
        Self {
            clusters,
            iterations,
            ..Self::default()
        }
    }

    /// Set the sampling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the initializer.
    pub fn init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    /// Set the empty-cluster policy.
    pub fn empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Set the reset policy.
    pub fn reset(mut self, policy: ResetPolicy) -> Self {
        self.reset = policy;
        self
    }

    /// Run phases on a dedicated pool with this many workers.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> KmResult<()> {
        if self.clusters == 0 {
            return Err(KmError::InvalidConfig("clusters must be > 0".into()));
        }
        if self.iterations == 0 {
            return Err(KmError::InvalidConfig("iterations must be > 0".into()));
        }
        if self.threads == Some(0) {
            return Err(KmError::InvalidConfig("threads must be > 0".into()));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> KmResult<ClusterConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        KmError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file {}: {e}", path.display()),
        ))
    })?;
    let config: ClusterConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the config file path using priority order:
/// 1. Explicit path (CLI arg)
/// 2. LLOYD_CONFIG environment variable
/// 3. lloyd.toml in the current directory
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var("LLOYD_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let cwd_config = PathBuf::from("lloyd.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}
