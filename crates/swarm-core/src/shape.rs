//! Procedural target generators for the built-in shape families.
//!
//! Every generator emits exactly `count` points. Randomized shapes draw from
//! the caller's RNG so tests can seed them; DnaHelix is fully deterministic.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CUBE_SIZE, FLOWER_K, HEART_SCALE, HELIX_HALF_HEIGHT, HELIX_RADIUS, HELIX_TURNS,
    PLANET_RADIUS, PLANET_SHARE, RING_HALF_THICKNESS, RING_INNER, RING_OUTER, SPHERE_RADIUS,
};
use crate::error::Error;
use crate::point::Point3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeVariant {
    Sphere,
    Cube,
    Heart,
    DnaHelix,
    Saturn,
    Flower,
}

impl ShapeVariant {
    pub const ALL: [ShapeVariant; 6] = [
        ShapeVariant::Sphere,
        ShapeVariant::Cube,
        ShapeVariant::Heart,
        ShapeVariant::DnaHelix,
        ShapeVariant::Saturn,
        ShapeVariant::Flower,
    ];

    /// Display label shown by UI layers.
    pub fn label(self) -> &'static str {
        match self {
            ShapeVariant::Sphere => "Sphere",
            ShapeVariant::Cube => "Cube",
            ShapeVariant::Heart => "Heart",
            ShapeVariant::DnaHelix => "DNA Helix",
            ShapeVariant::Saturn => "Saturn",
            ShapeVariant::Flower => "Flower",
        }
    }
}

impl fmt::Display for ShapeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShapeVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "sphere" => Ok(ShapeVariant::Sphere),
            "cube" => Ok(ShapeVariant::Cube),
            "heart" => Ok(ShapeVariant::Heart),
            "dna" | "dnahelix" | "helix" => Ok(ShapeVariant::DnaHelix),
            "saturn" => Ok(ShapeVariant::Saturn),
            "flower" => Ok(ShapeVariant::Flower),
            _ => Err(Error::UnknownShape(s.to_string())),
        }
    }
}

/// Generate `count` target points for `variant`.
pub fn generate(variant: ShapeVariant, count: usize, rng: &mut impl Rng) -> Vec<Point3> {
    match variant {
        ShapeVariant::Sphere => sphere(count, SPHERE_RADIUS, rng),
        ShapeVariant::Cube => cube(count, rng),
        ShapeVariant::Heart => heart(count, rng),
        ShapeVariant::DnaHelix => dna_helix(count),
        ShapeVariant::Saturn => saturn(count, rng),
        ShapeVariant::Flower => flower(count, rng),
    }
}

/// Uniform-on-sphere sampling. φ = acos(2u − 1) keeps area density uniform.
pub fn sphere(count: usize, radius: f64, rng: &mut impl Rng) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            let theta = rng.random::<f64>() * TAU;
            let phi = (rng.random::<f64>() * 2.0 - 1.0).acos();
            Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            )
        })
        .collect()
}

/// Solid-volume fill of an axis-aligned cube.
pub fn cube(count: usize, rng: &mut impl Rng) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            Point3::new(
                (rng.random::<f64>() - 0.5) * CUBE_SIZE,
                (rng.random::<f64>() - 0.5) * CUBE_SIZE,
                (rng.random::<f64>() - 0.5) * CUBE_SIZE,
            )
        })
        .collect()
}

/// Parametric heart outline with depth tapering toward the bottom cusp.
pub fn heart(count: usize, rng: &mut impl Rng) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            let t = rng.random::<f64>() * TAU;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
            let taper = 1.0 - (t - PI).abs() / PI;
            let z = (rng.random::<f64>() - 0.5) * 2.0 * taper;
            Point3::new(x * HEART_SCALE, y * HEART_SCALE, z)
        })
        .collect()
}

/// Two interleaved strands: even indices at phase 0, odd indices at phase π.
pub fn dna_helix(count: usize) -> Vec<Point3> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let frac = i as f64 / n;
            let t = frac * HELIX_TURNS * TAU;
            let phase = if i % 2 == 0 { 0.0 } else { PI };
            Point3::new(
                (t + phase).cos() * HELIX_RADIUS,
                frac * 2.0 * HELIX_HALF_HEIGHT - HELIX_HALF_HEIGHT,
                (t + phase).sin() * HELIX_RADIUS,
            )
        })
        .collect()
}

/// Number of Saturn points that belong to the planet body.
pub fn planet_count(count: usize) -> usize {
    (count as f64 * PLANET_SHARE).floor() as usize
}

/// Planet body first, flat ring after it.
pub fn saturn(count: usize, rng: &mut impl Rng) -> Vec<Point3> {
    let planet = planet_count(count);
    let mut points = sphere(planet, PLANET_RADIUS, rng);
    points.reserve(count - planet);

    for _ in planet..count {
        let angle = rng.random::<f64>() * TAU;
        let distance = RING_INNER + rng.random::<f64>() * (RING_OUTER - RING_INNER);
        let y = (rng.random::<f64>() - 0.5) * 2.0 * RING_HALF_THICKNESS;
        points.push(Point3::new(distance * angle.cos(), y, distance * angle.sin()));
    }
    points
}

/// Rose-curve petals projected onto a cupped surface.
pub fn flower(count: usize, rng: &mut impl Rng) -> Vec<Point3> {
    (0..count)
        .map(|_| {
            let u = rng.random::<f64>() * TAU;
            let v = rng.random::<f64>() * PI;
            let r_shape = (FLOWER_K * u * 0.5).cos().abs();
            let r = r_shape * 4.0 + 0.5;
            Point3::new(
                r * v.sin() * u.cos(),
                r * v.cos() * 0.5 + (v * 2.0).cos(),
                r * v.sin() * u.sin(),
            )
        })
        .collect()
}
