//! The controlling loop's view of the system: UI-facing setters plus the two
//! tick entry points (`frame_tick` for camera frames, `render_tick` for
//! drawing). An external scheduler decides when each tick runs.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::color::{DEFAULT_COLOR, Rgb, assign_gradient};
use crate::constants::{FRAME_HEIGHT, FRAME_WIDTH, PARTICLE_COUNT, SIZE_MAX, SIZE_MIN};
use crate::densify::{Densify, densify, fit_to_count};
use crate::error::Result;
use crate::gesture::{FrameError, FrameSource, FrameStats, GestureSignalExtractor};
use crate::morph::{MorphEngine, RenderFrame};
use crate::point::Point3;
use crate::shape::{ShapeVariant, generate};
use crate::smoother::{OpennessReader, Smoother};

/// Initial state of a [`Controller`].
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub particle_count: usize,
    pub shape: ShapeVariant,
    pub color: Rgb,
    pub particle_size: f64,
    pub openness: f64,
    pub frame_width: usize,
    pub frame_height: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            shape: ShapeVariant::Saturn,
            color: DEFAULT_COLOR,
            particle_size: 1.0,
            openness: 0.0,
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            seed: None,
        }
    }
}

/// Where the current target buffer came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetOrigin {
    Shape(ShapeVariant),
    External,
}

pub struct Controller {
    rng: SmallRng,
    engine: MorphEngine,
    extractor: GestureSignalExtractor,
    smoother: Smoother,
    openness: OpennessReader,
    origin: TargetOrigin,
    color: Rgb,
    particle_size: f64,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let count = config.particle_count;

        let targets = fit_to_count(generate(config.shape, count, &mut rng), count);
        let colors = assign_gradient(config.color, count, &mut rng);
        let engine = MorphEngine::with_colors(targets, colors);

        let smoother = Smoother::new(config.openness.clamp(0.0, 1.0));
        let openness = smoother.reader();

        Self {
            rng,
            engine,
            extractor: GestureSignalExtractor::new(config.frame_width, config.frame_height),
            smoother,
            openness,
            origin: TargetOrigin::Shape(config.shape),
            color: config.color,
            particle_size: clamp_size(config.particle_size),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.engine.len()
    }

    pub fn engine(&self) -> &MorphEngine {
        &self.engine
    }

    pub fn target_origin(&self) -> TargetOrigin {
        self.origin
    }

    /// Current built-in shape, if the targets came from one.
    pub fn shape(&self) -> Option<ShapeVariant> {
        match self.origin {
            TargetOrigin::Shape(variant) => Some(variant),
            TargetOrigin::External => None,
        }
    }

    /// Regenerate the target buffer. Particles glide from where they are.
    pub fn set_shape(&mut self, variant: ShapeVariant) -> Result<()> {
        let count = self.engine.len();
        let targets = fit_to_count(generate(variant, count, &mut self.rng), count);
        self.engine.set_targets(targets)?;
        self.origin = TargetOrigin::Shape(variant);
        tracing::debug!("shape set to {variant}");
        Ok(())
    }

    /// Use an externally produced cloud as the target buffer.
    pub fn set_points(&mut self, points: &[Point3], strategy: Densify) -> Result<()> {
        let targets = densify(points, self.engine.len(), strategy);
        self.engine.set_targets(targets)?;
        self.origin = TargetOrigin::External;
        tracing::debug!(
            "external cloud of {} points densified ({strategy})",
            points.len()
        );
        Ok(())
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Recompute the whole gradient, re-rolling lightness jitter.
    pub fn set_color(&mut self, color: Rgb) -> Result<()> {
        let colors = assign_gradient(color, self.engine.len(), &mut self.rng);
        self.engine.set_colors(colors)?;
        self.color = color;
        Ok(())
    }

    pub fn particle_size(&self) -> f64 {
        self.particle_size
    }

    /// Clamped to the slider range. Non-finite input is ignored.
    pub fn set_particle_size(&mut self, size: f64) {
        if size.is_finite() {
            self.particle_size = clamp_size(size);
        }
    }

    /// Drive openness by hand. Ignored (returns `false`) while the camera is on.
    pub fn set_manual_openness(&mut self, value: f64) -> bool {
        if self.extractor.is_active() || !value.is_finite() {
            return false;
        }
        self.smoother.set(value.clamp(0.0, 1.0));
        true
    }

    /// Latest committed smoothed openness.
    pub fn openness(&self) -> f64 {
        self.openness.load()
    }

    pub fn openness_reader(&self) -> OpennessReader {
        self.openness.clone()
    }

    pub fn camera_active(&self) -> bool {
        self.extractor.is_active()
    }

    /// Switch gesture mode on. On failure the manual control keeps working.
    pub fn activate_camera<F>(&mut self, acquire: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<Box<dyn FrameSource>, FrameError>,
    {
        self.extractor.activate(acquire)?;
        Ok(())
    }

    /// Switch gesture mode off, releasing the frame source. Openness keeps its
    /// last smoothed value until set manually.
    pub fn deactivate_camera(&mut self) {
        self.extractor.deactivate();
    }

    /// Process a ready camera frame, if any. Returns the new smoothed value.
    pub fn frame_tick(&mut self) -> Option<f64> {
        self.frame_tick_stats().map(|(_, smoothed)| smoothed)
    }

    /// Like [`frame_tick`](Self::frame_tick) but also returns the raw stats.
    pub fn frame_tick_stats(&mut self) -> Option<(FrameStats, f64)> {
        let stats = self.extractor.tick()?;
        let smoothed = self.smoother.update(stats.raw_openness);
        Some((stats, smoothed))
    }

    /// Advance the particle buffer to `time` seconds since start.
    pub fn render_tick(&mut self, time: f64) {
        self.engine.tick(self.openness(), self.particle_size, time);
    }

    pub fn frame(&self, time: f64) -> RenderFrame {
        self.engine.frame(time)
    }
}

fn clamp_size(size: f64) -> f64 {
    size.clamp(SIZE_MIN, SIZE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureFrame;

    struct SkinCamera;

    impl FrameSource for SkinCamera {
        fn frame_ready(&mut self) -> bool {
            true
        }

        fn read_frame(&mut self, w: usize, h: usize) -> std::result::Result<GestureFrame, FrameError> {
            Ok(GestureFrame::uniform(w, h, [200, 120, 90]))
        }

        fn stop(&mut self) {}
    }

    fn skin_camera() -> std::result::Result<Box<dyn FrameSource>, FrameError> {
        Ok(Box::new(SkinCamera))
    }

    fn controller() -> Controller {
        Controller::new(ControllerConfig {
            particle_count: 200,
            seed: Some(7),
            ..ControllerConfig::default()
        })
    }

    #[test]
    fn test_defaults() {
        let c = controller();
        assert_eq!(c.shape(), Some(ShapeVariant::Saturn));
        assert_eq!(c.color(), DEFAULT_COLOR);
        assert_eq!(c.particle_size(), 1.0);
        assert_eq!(c.openness(), 0.0);
        assert!(!c.camera_active());
        assert_eq!(c.engine().particles().colors().len(), 200);
    }

    #[test]
    fn test_size_clamped() {
        let mut c = controller();
        c.set_particle_size(10.0);
        assert_eq!(c.particle_size(), SIZE_MAX);
        c.set_particle_size(0.0);
        assert_eq!(c.particle_size(), SIZE_MIN);
        c.set_particle_size(f64::NAN);
        assert_eq!(c.particle_size(), SIZE_MIN);
    }

    #[test]
    fn test_manual_openness_only_without_camera() {
        let mut c = controller();
        assert!(c.set_manual_openness(0.7));
        assert_eq!(c.openness(), 0.7);
        assert!(c.set_manual_openness(3.0));
        assert_eq!(c.openness(), 1.0);

        c.activate_camera(skin_camera).unwrap();
        assert!(!c.set_manual_openness(0.1));
        assert_eq!(c.openness(), 1.0);
    }

    #[test]
    fn test_frame_tick_smooths() {
        let mut c = controller();
        c.activate_camera(skin_camera).unwrap();
        let v = c.frame_tick().unwrap();
        assert!((v - 0.1).abs() < 1e-12);
        assert_eq!(c.openness(), v);
    }

    #[test]
    fn test_frame_tick_inactive() {
        let mut c = controller();
        assert!(c.frame_tick().is_none());
    }

    #[test]
    fn test_camera_failure_leaves_manual_working() {
        let mut c = controller();
        let err = c.activate_camera(|| Err(FrameError::Unavailable("no device".into())));
        assert!(err.is_err());
        assert!(!c.camera_active());
        assert!(c.set_manual_openness(0.3));
        assert_eq!(c.openness(), 0.3);
    }

    #[test]
    fn test_set_points_marks_external() {
        let mut c = controller();
        c.set_points(&[Point3::new(1.0, 1.0, 1.0)], Densify::Cycle).unwrap();
        assert_eq!(c.target_origin(), TargetOrigin::External);
        assert_eq!(c.shape(), None);
        assert!(c.engine().targets().iter().all(|p| *p == Point3::new(1.0, 1.0, 1.0)));
        c.set_shape(ShapeVariant::Cube).unwrap();
        assert_eq!(c.shape(), Some(ShapeVariant::Cube));
    }

    #[test]
    fn test_set_color_regenerates() {
        let mut c = controller();
        let before = c.engine().particles().colors().to_vec();
        c.set_color(Rgb::named("red").unwrap()).unwrap();
        assert_ne!(c.engine().particles().colors(), before.as_slice());
    }
}
