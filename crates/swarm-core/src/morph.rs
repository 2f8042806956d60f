//! Per-tick morphing of the live particle buffer toward an expanded target.
//!
//! The expansion direction is taken from the target, not from the particle's
//! current position, so a shape switch re-aims the expansion immediately while
//! positions keep gliding from wherever they are.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::constants::{
    BREATHE_AMPLITUDE, BREATHE_RATE, BREATHE_STAGGER, CLOUD_SPIN_RATE, DIRECTION_EPSILON,
    EXPANSION_GAIN, LERP_SPEED, SCALE_BASE, SCALE_FLOOR, SCALE_OPENNESS_GAIN,
};
use crate::error::{Error, Result};
use crate::point::Point3;

/// Live particle state. All three vectors share one length for the lifetime
/// of the buffer; index `i` pairs with target `i`.
#[derive(Clone, Debug)]
pub struct ParticleBuffer {
    positions: Vec<Point3>,
    colors: Vec<Rgb>,
    scales: Vec<f64>,
}

impl ParticleBuffer {
    /// All particles start at the origin.
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![Point3::ORIGIN; count],
            colors: vec![Rgb::default(); count],
            scales: vec![particle_scale(0.0, 1.0); count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Everything the presentation layer needs for one drawn frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderFrame {
    pub time: f64,
    pub positions: Vec<Point3>,
    pub colors: Vec<Rgb>,
    pub scales: Vec<f64>,
    pub rotations: Vec<[f64; 3]>,
    /// Whole-cloud rotation about the vertical axis.
    pub cloud_rotation: f64,
}

/// Owns the target and particle buffers and advances them each render tick.
#[derive(Clone, Debug)]
pub struct MorphEngine {
    targets: Vec<Point3>,
    particles: ParticleBuffer,
}

impl MorphEngine {
    /// Engine sized to `targets.len()`, particles parked at the origin.
    pub fn new(targets: Vec<Point3>) -> Self {
        let particles = ParticleBuffer::new(targets.len());
        Self { targets, particles }
    }

    /// Engine with per-particle colors. `colors` is fitted to the target
    /// count, padding with black.
    pub fn with_colors(targets: Vec<Point3>, mut colors: Vec<Rgb>) -> Self {
        let mut engine = Self::new(targets);
        colors.resize(engine.len(), Rgb::default());
        engine.particles.colors = colors;
        engine
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Point3] {
        &self.targets
    }

    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    /// Replace the whole target buffer. Current positions are left untouched.
    pub fn set_targets(&mut self, targets: Vec<Point3>) -> Result<()> {
        if targets.len() != self.particles.len() {
            return Err(Error::LengthMismatch {
                expected: self.particles.len(),
                actual: targets.len(),
            });
        }
        self.targets = targets;
        Ok(())
    }

    pub fn set_colors(&mut self, colors: Vec<Rgb>) -> Result<()> {
        if colors.len() != self.particles.len() {
            return Err(Error::LengthMismatch {
                expected: self.particles.len(),
                actual: colors.len(),
            });
        }
        self.particles.colors = colors;
        Ok(())
    }

    /// Advance every particle one step.
    pub fn tick(&mut self, openness: f64, size: f64, time: f64) {
        let scale = particle_scale(openness, size);
        for (i, (current, target)) in self
            .particles
            .positions
            .iter_mut()
            .zip(&self.targets)
            .enumerate()
        {
            let goal = expanded_target(*target, i, openness, time);
            *current += (goal - *current) * LERP_SPEED;
        }
        self.particles.scales.fill(scale);
    }

    /// Snapshot of the current state for drawing at `time`.
    pub fn frame(&self, time: f64) -> RenderFrame {
        RenderFrame {
            time,
            positions: self.particles.positions.clone(),
            colors: self.particles.colors.clone(),
            scales: self.particles.scales.clone(),
            rotations: (0..self.len()).map(|i| particle_rotation(time, i)).collect(),
            cloud_rotation: cloud_rotation(time),
        }
    }
}

/// Target pushed outward along its own direction by openness plus breathing.
pub fn expanded_target(target: Point3, index: usize, openness: f64, time: f64) -> Point3 {
    let expansion = openness * EXPANSION_GAIN;
    let breathe = breathe(index, time);
    let dist = target.norm() + DIRECTION_EPSILON;
    let direction = target * (1.0 / dist);
    target + direction * (expansion + breathe)
}

/// Phase-staggered breathing displacement for particle `index`.
pub fn breathe(index: usize, time: f64) -> f64 {
    (time * BREATHE_RATE + index as f64 * BREATHE_STAGGER).sin() * BREATHE_AMPLITUDE
}

pub fn particle_scale(openness: f64, size: f64) -> f64 {
    (SCALE_BASE - openness * SCALE_OPENNESS_GAIN).max(SCALE_FLOOR) * size
}

/// Cosmetic per-particle Euler rotation. Stateless.
pub fn particle_rotation(time: f64, index: usize) -> [f64; 3] {
    [time * 0.2 + index as f64, time * 0.1, 0.0]
}

pub fn cloud_rotation(time: f64) -> f64 {
    time * CLOUD_SPIN_RATE
}
