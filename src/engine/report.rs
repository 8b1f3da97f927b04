//! Per-round observation of a running engine.

use serde::Serialize;

use crate::types::Centroid;

/// State of the centroid set at the end of one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSnapshot {
    /// Zero-based round index.
    pub round: usize,
    /// Centroid positions after this round's recentre phase.
    pub centroids: Vec<Centroid>,
    /// Points per centroid at the recentre phase.
    pub sizes: Vec<usize>,
    /// Centroids that received no points this round.
    pub empty: Vec<usize>,
    /// Sum of squared distances measured by this round's assignment phase.
    pub inertia: f64,
}

/// Receives a snapshot after every recentre phase.
pub trait RoundObserver {
    fn on_round(&mut self, snapshot: &RoundSnapshot);
}

impl<F: FnMut(&RoundSnapshot)> RoundObserver for F {
    fn on_round(&mut self, snapshot: &RoundSnapshot) {
        self(snapshot)
    }
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RoundObserver for NoopObserver {
    fn on_round(&mut self, _snapshot: &RoundSnapshot) {}
}

/// Logs centroid positions at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RoundObserver for LogObserver {
    fn on_round(&mut self, snapshot: &RoundSnapshot) {
        log::debug!(
            "round {}: inertia {:.6}",
            snapshot.round,
            snapshot.inertia
        );
        for (i, c) in snapshot.centroids.iter().enumerate() {
            log::debug!("  centroid {}: ({}, {})", i, c.x, c.y);
        }
    }
}

/// Keeps every snapshot in order.
#[derive(Debug, Default, Clone)]
pub struct RoundHistory {
    pub rounds: Vec<RoundSnapshot>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inertia of each round, in order.
    pub fn inertias(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.inertia).collect()
    }
}

impl RoundObserver for RoundHistory {
    fn on_round(&mut self, snapshot: &RoundSnapshot) {
        self.rounds.push(snapshot.clone());
    }
}
