//! Reads newline-delimited `x,y` point files.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::Serialize;

use crate::types::error::{KmError, KmResult};
use crate::types::{Point, MAX_COORDINATE};

/// Reader for `x,y` point files (one point per line, no header).
pub struct PointReader;

impl PointReader {
    /// Read a point file from disk.
    pub fn read_from_file(path: &Path) -> KmResult<Vec<Point>> {
        let file = File::open(path)?;
        let points = Self::read_from(file)?;
        log::debug!("Read {} points from {}", points.len(), path.display());
        Ok(points)
    }

    /// Read points from any reader.
    pub fn read_from(reader: impl Read) -> KmResult<Vec<Point>> {
        let mut points = Vec::new();
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            points.push(parse_line(&line, idx + 1)?);
        }
        Ok(points)
    }

    /// Parse points from an in-memory string.
    pub fn parse_str(input: &str) -> KmResult<Vec<Point>> {
        Self::read_from(input.as_bytes())
    }
}

/// Parse a single `x,y` record. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> KmResult<Point> {
    let mut fields = line.split(',');
    let x = parse_field(fields.next(), "x", line_no)?;
    let y = parse_field(fields.next(), "y", line_no)?;
    if fields.next().is_some() {
        return Err(KmError::MalformedInput {
            line: line_no,
            reason: "expected exactly two fields".into(),
        });
    }
    Ok(Point::new(x, y))
}

fn parse_field(field: Option<&str>, name: &str, line_no: usize) -> KmResult<f64> {
    let raw = field.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(KmError::MalformedInput {
            line: line_no,
            reason: format!("missing {name} field"),
        });
    }
    let value: f64 = raw.parse().map_err(|_| KmError::MalformedInput {
        line: line_no,
        reason: format!("invalid {name} value {raw:?}"),
    })?;
    if !value.is_finite() {
        return Err(KmError::MalformedInput {
            line: line_no,
            reason: format!("non-finite {name} value {raw:?}"),
        });
    }
    if value.abs() > MAX_COORDINATE {
        return Err(KmError::MalformedInput {
            line: line_no,
            reason: format!("{name} value {raw:?} exceeds ±{MAX_COORDINATE:e}"),
        });
    }
    Ok(value)
}

/// Summary of a point set, as shown by `lloyd inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSetInfo {
    pub count: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub mean_x: f64,
    pub mean_y: f64,
}

impl PointSetInfo {
    /// Compute the bounding box and mean. Returns None for an empty set.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut info = Self {
            count: points.len(),
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            mean_x: 0.0,
            mean_y: 0.0,
        };
        for p in points {
            info.min_x = info.min_x.min(p.x);
            info.max_x = info.max_x.max(p.x);
            info.min_y = info.min_y.min(p.y);
            info.max_y = info.max_y.max(p.y);
            info.mean_x += p.x;
            info.mean_y += p.y;
        }
        info.mean_x /= points.len() as f64;
        info.mean_y /= points.len() as f64;
        Some(info)
    }
}
