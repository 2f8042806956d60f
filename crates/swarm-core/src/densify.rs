//! Fitting point clouds of arbitrary size onto the fixed particle count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::point::Point3;

/// How a sparse cloud is stretched to the particle count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Densify {
    /// Repeat source points in order: particle `i` takes source `i mod len`.
    #[default]
    Cycle,
    /// Resample evenly along the source sequence, interpolating neighbours.
    Interpolate,
}

impl fmt::Display for Densify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Densify::Cycle => f.write_str("cycle"),
            Densify::Interpolate => f.write_str("interpolate"),
        }
    }
}

impl FromStr for Densify {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cycle" => Ok(Densify::Cycle),
            "interpolate" | "lerp" => Ok(Densify::Interpolate),
            _ => Err(Error::UnknownDensify(s.to_string())),
        }
    }
}

/// Truncate, or pad with origin points, to exactly `count`.
pub fn fit_to_count(mut points: Vec<Point3>, count: usize) -> Vec<Point3> {
    points.resize(count, Point3::ORIGIN);
    points
}

/// Produce exactly `count` points from `source`. An empty source yields
/// origin points; a source already at least `count` long is truncated.
pub fn densify(source: &[Point3], count: usize, strategy: Densify) -> Vec<Point3> {
    if source.is_empty() {
        return vec![Point3::ORIGIN; count];
    }
    if source.len() >= count {
        return source[..count].to_vec();
    }

    match strategy {
        Densify::Cycle => (0..count).map(|i| source[i % source.len()]).collect(),
        Densify::Interpolate => {
            let last = source.len() - 1;
            let span = (count - 1).max(1) as f64;
            (0..count)
                .map(|i| {
                    let pos = i as f64 * last as f64 / span;
                    let lo = (pos.floor() as usize).min(last);
                    let hi = (lo + 1).min(last);
                    source[lo].lerp(source[hi], pos - lo as f64)
                })
                .collect()
        }
    }
}
