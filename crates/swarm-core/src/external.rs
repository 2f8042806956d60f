//! JSON wire format for point clouds produced by the external text-to-shape
//! generator: `{"points": [{"x": .., "y": .., "z": ..}, ...]}`.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_EXTERNAL_POINTS;
use crate::error::{Error, Result};
use crate::point::Point3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct WirePointCloud {
    /// Absent when the generator returned something else entirely.
    #[serde(default)]
    pub points: Option<Vec<WirePoint>>,
}

impl From<WirePoint> for Point3 {
    fn from(p: WirePoint) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

impl From<Point3> for WirePoint {
    fn from(p: Point3) -> Self {
        WirePoint {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// Parse a generator payload. Keeps at most `MAX_EXTERNAL_POINTS` points and
/// rejects a missing point list or non-finite coordinates.
pub fn parse_point_cloud(json: &str) -> Result<Vec<Point3>> {
    let cloud: WirePointCloud = serde_json::from_str(json)?;
    let points = cloud
        .points
        .ok_or_else(|| Error::MalformedPoints("missing `points` list".to_string()))?;

    let mut out = Vec::with_capacity(points.len().min(MAX_EXTERNAL_POINTS));
    for (i, wire) in points.into_iter().take(MAX_EXTERNAL_POINTS).enumerate() {
        let p = Point3::from(wire);
        if !p.is_finite() {
            return Err(Error::MalformedPoints(format!("point {i} is not finite")));
        }
        out.push(p);
    }
    Ok(out)
}

/// Serialize points in the same wire format.
pub fn export_point_cloud(points: &[Point3]) -> std::result::Result<String, serde_json::Error> {
    let cloud = WirePointCloud {
        points: Some(points.iter().copied().map(WirePoint::from).collect()),
    };
    serde_json::to_string_pretty(&cloud)
}
