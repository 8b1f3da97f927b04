//! CLI command implementations.

use std::path::Path;

use crate::engine::{ClusterEngine, RoundHistory, RoundSnapshot, RunSummary};
use crate::format::{PointReader, PointSetInfo};
use crate::types::{ClusterConfig, KmResult, Point};

/// Cluster a point file and print per-round centroids and the elapsed time.
pub fn cmd_run(path: &Path, config: ClusterConfig, json: bool, sample: usize) -> KmResult<()> {
    let points = PointReader::read_from_file(path)?;
    let mut engine = ClusterEngine::new(points, config)?;

    if json {
        let mut history = RoundHistory::new();
        let summary = engine.run_with(&mut history);
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "points": engine.points().len(),
            "summary": summary,
            "rounds": history.rounds,
            "sample": sample_points(engine.points(), sample),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else {
        let summary = engine.run_with(&mut |snapshot: &RoundSnapshot| {
            print!("{}", format_round(snapshot));
        });
        if sample > 0 {
            print!("{}", format_sample(engine.points(), sample));
        }
        print!("{}", format_footer(&summary));
    }
    Ok(())
}

/// Print the size, bounding box and mean of a point file. An empty file
/// reports zero points and no bounds.
pub fn cmd_inspect(path: &Path, json: bool) -> KmResult<()> {
    let points = PointReader::read_from_file(path)?;
    let info = PointSetInfo::from_points(&points);

    if json {
        let value = serde_json::json!({
            "file": path.display().to_string(),
            "points": points.len(),
            "info": info,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
    } else {
        print!("{}", format_inspect(path, info.as_ref()));
    }
    Ok(())
}

/// Text block printed by `inspect`.
pub fn format_inspect(path: &Path, info: Option<&PointSetInfo>) -> String {
    let mut out = format!("File: {}\n", path.display());
    match info {
        Some(info) => {
            out.push_str(&format!("Points: {}\n", info.count));
            out.push_str(&format!("X range: {} .. {}\n", info.min_x, info.max_x));
            out.push_str(&format!("Y range: {} .. {}\n", info.min_y, info.max_y));
            out.push_str(&format!("Mean: ({}, {})\n", info.mean_x, info.mean_y));
        }
        None => out.push_str("Points: 0\n"),
    }
    out
}

/// Text block for one round: a header line, then one line per centroid.
pub fn format_round(snapshot: &RoundSnapshot) -> String {
    let mut out = format!("iteration: {}\n", snapshot.round);
    for (i, c) in snapshot.centroids.iter().enumerate() {
        out.push_str(&format!("cluster center: {}\tx: {}\ty: {}\n", i, c.x, c.y));
    }
    out.push('\n');
    out
}

/// Table of the first `limit` points and their labels.
pub fn format_sample(points: &[Point], limit: usize) -> String {
    let mut out = String::from("\tx\t\ty\t  Cluster Label\n");
    out.push_str("  ----------------------------------------------\n");
    for p in points.iter().take(limit) {
        out.push_str(&format!("\t{}\t|\t{}\t|\t{}\n", p.x, p.y, p.label));
    }
    out.push('\n');
    out
}

/// Closing lines: empty-cluster count, inertia and elapsed time.
pub fn format_footer(summary: &RunSummary) -> String {
    let mut out = String::new();
    if !summary.empty_clusters.is_empty() {
        out.push_str(&format!(
            "Empty clusters: {} ({})\n",
            summary.empty_clusters.len(),
            summary.config.empty_cluster
        ));
    }
    out.push_str(&format!("Inertia: {:.6}\n", summary.inertia));
    out.push_str(&format!(
        "The total time of the program is: {} microseconds\n",
        summary.elapsed_micros
    ));
    out
}

fn sample_points(points: &[Point], limit: usize) -> Vec<serde_json::Value> {
    points
        .iter()
        .take(limit)
        .map(|p| serde_json::json!({"x": p.x, "y": p.y, "label": p.label}))
        .collect()
}
