//! Exponential smoothing of raw openness, and the shared cell that carries
//! the smoothed value to the render side.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::SMOOTHING_FACTOR;

/// Read side of the smoothed openness. Cheap to clone; never observes a
/// partially written value.
#[derive(Clone, Debug)]
pub struct OpennessReader {
    bits: Arc<AtomicU64>,
}

impl OpennessReader {
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// EMA filter. The only writer of its openness cell.
#[derive(Debug)]
pub struct Smoother {
    smoothed: f64,
    factor: f64,
    bits: Arc<AtomicU64>,
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Smoother {
    pub fn new(baseline: f64) -> Self {
        Self::with_factor(baseline, SMOOTHING_FACTOR)
    }

    pub fn with_factor(baseline: f64, factor: f64) -> Self {
        Self {
            smoothed: baseline,
            factor,
            bits: Arc::new(AtomicU64::new(baseline.to_bits())),
        }
    }

    pub fn value(&self) -> f64 {
        self.smoothed
    }

    pub fn reader(&self) -> OpennessReader {
        OpennessReader {
            bits: Arc::clone(&self.bits),
        }
    }

    /// Fold one raw sample in and publish the result.
    pub fn update(&mut self, raw: f64) -> f64 {
        self.smoothed += (raw - self.smoothed) * self.factor;
        self.publish();
        self.smoothed
    }

    /// Overwrite the smoothed value directly, bypassing the filter.
    pub fn set(&mut self, value: f64) {
        self.smoothed = value;
        self.publish();
    }

    fn publish(&self) {
        self.bits.store(self.smoothed.to_bits(), Ordering::Release);
    }
}
