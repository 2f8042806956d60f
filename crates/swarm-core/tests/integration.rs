//! End-to-end flows through the controller: shape switching, camera-driven
//! openness, external clouds, and morph convergence.

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use swarm_core::constants::LERP_SPEED;
use swarm_core::morph::expanded_target;
use swarm_core::{
    Controller, ControllerConfig, Densify, FrameError, FrameSource, GestureFrame, MorphEngine,
    Point3, ShapeVariant, parse_point_cloud,
};

const SKIN: [u8; 3] = [210, 140, 110];
const WALL: [u8; 3] = [30, 30, 40];

fn controller(shape: ShapeVariant) -> Controller {
    Controller::new(ControllerConfig {
        particle_count: 600,
        shape,
        seed: Some(42),
        ..ControllerConfig::default()
    })
}

fn mean_radius(c: &Controller) -> f64 {
    let positions = c.engine().particles().positions();
    positions.iter().map(|p| p.norm()).sum::<f64>() / positions.len() as f64
}

/// A hand filling more of the frame each read, up to `max_rows` rows of skin.
struct OpeningHand {
    rows: usize,
    max_rows: usize,
    stops: Rc<Cell<u32>>,
}

impl FrameSource for OpeningHand {
    fn frame_ready(&mut self) -> bool {
        true
    }

    fn read_frame(&mut self, w: usize, h: usize) -> Result<GestureFrame, FrameError> {
        self.rows = (self.rows + 1).min(self.max_rows).min(h);
        let pixels = (0..w * h)
            .map(|i| if i / w < self.rows { SKIN } else { WALL })
            .collect();
        GestureFrame::new(w, h, pixels)
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }
}

/// Zero openness with breathing frozen: the gap to the goal shrinks by a
/// factor of (1 - LERP_SPEED) per tick and never overshoots.
#[test]
fn morph_geometric_convergence() {
    let target = Point3::new(3.0, 1.0, 2.0);
    let mut engine = MorphEngine::new(vec![target]);
    // breathe(0, 0) == 0, so the goal is exactly the target.
    let goal = expanded_target(target, 0, 0.0, 0.0);
    assert_eq!(goal, target);

    for k in 1..=60 {
        engine.tick(0.0, 1.0, 0.0);
        let current = engine.particles().positions()[0];
        let expected = target - target * (1.0 - LERP_SPEED).powi(k);
        assert_abs_diff_eq!(current.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(current.y, expected.y, epsilon = 1e-9);
        assert_abs_diff_eq!(current.z, expected.z, epsilon = 1e-9);
        assert!(current.x <= target.x && current.y <= target.y && current.z <= target.z);
    }
}

#[test]
fn shape_switch_keeps_positions_continuous() {
    let mut c = controller(ShapeVariant::Sphere);
    for tick in 0..30 {
        c.render_tick(tick as f64 / 60.0);
    }
    let before = c.engine().particles().positions().to_vec();
    let old_targets = c.engine().targets().to_vec();

    c.set_shape(ShapeVariant::DnaHelix).unwrap();
    assert_ne!(c.engine().targets(), old_targets.as_slice());
    assert_eq!(c.engine().particles().positions(), before.as_slice());

    // One more tick moves each particle only a fraction of the way.
    c.render_tick(0.5);
    for (i, (p, q)) in before.iter().zip(c.engine().particles().positions()).enumerate() {
        let goal = expanded_target(c.engine().targets()[i], i, 0.0, 0.5);
        let step = p.distance(*q);
        assert!(step <= p.distance(goal) * LERP_SPEED + 1e-9, "particle {i} jumped");
    }
}

#[test]
fn particles_settle_on_shape() {
    let mut c = controller(ShapeVariant::Saturn);
    for tick in 0..400 {
        c.render_tick(tick as f64 / 60.0);
    }
    let time = 399.0 / 60.0;
    for (i, p) in c.engine().particles().positions().iter().enumerate() {
        let goal = expanded_target(c.engine().targets()[i], i, 0.0, time);
        // Breathing keeps moving the goal; residual lag is bounded.
        assert!(p.distance(goal) < 0.1, "particle {i} off by {}", p.distance(goal));
    }
}

#[test]
fn opening_hand_expands_cloud() {
    let stops = Rc::new(Cell::new(0));
    let mut c = controller(ShapeVariant::Sphere);
    for tick in 0..200 {
        c.render_tick(tick as f64 / 60.0);
    }
    let closed_radius = mean_radius(&c);

    let hand_stops = Rc::clone(&stops);
    c.activate_camera(move || {
        let source: Box<dyn FrameSource> = Box::new(OpeningHand {
            rows: 0,
            max_rows: 12,
            stops: hand_stops,
        });
        Ok(source)
    })
    .unwrap();

    let mut last = 0.0;
    for tick in 200..500 {
        if let Some(smoothed) = c.frame_tick() {
            assert!(smoothed >= last - 1e-12, "openness fell while hand opened");
            last = smoothed;
        }
        c.render_tick(tick as f64 / 60.0);
    }

    // Half the frame is skin: raw openness saturates at 1.
    assert!(c.openness() > 0.9, "openness = {}", c.openness());
    assert!(mean_radius(&c) > closed_radius + 4.0);
    for s in c.engine().particles().scales() {
        assert!(*s < 0.1);
    }

    c.deactivate_camera();
    assert_eq!(stops.get(), 1);
    let held = c.openness();
    assert!(c.frame_tick().is_none());
    assert_eq!(c.openness(), held, "openness holds after camera off");
    assert!(c.set_manual_openness(0.0));
    assert_eq!(c.openness(), 0.0);
}

#[test]
fn dropping_controller_releases_camera() {
    let stops = Rc::new(Cell::new(0));
    {
        let mut c = controller(ShapeVariant::Cube);
        let hand_stops = Rc::clone(&stops);
        c.activate_camera(move || {
            let source: Box<dyn FrameSource> = Box::new(OpeningHand {
                rows: 0,
                max_rows: 4,
                stops: hand_stops,
            });
            Ok(source)
        })
        .unwrap();
        c.frame_tick();
    }
    assert_eq!(stops.get(), 1);
}

#[test]
fn external_cloud_failure_leaves_morph_untouched() {
    let mut c = controller(ShapeVariant::Heart);
    c.render_tick(0.0);
    let targets = c.engine().targets().to_vec();

    assert!(parse_point_cloud(r#"{"error":"quota"}"#).is_err());
    assert_eq!(c.engine().targets(), targets.as_slice());
    assert_eq!(c.shape(), Some(ShapeVariant::Heart));

    let points = parse_point_cloud(
        r#"{"points":[{"x":-4,"y":0,"z":0},{"x":0,"y":4,"z":0},{"x":4,"y":0,"z":0}]}"#,
    )
    .unwrap();
    c.set_points(&points, Densify::Interpolate).unwrap();
    assert_eq!(c.engine().targets().len(), 600);
    assert_eq!(c.engine().targets()[0], points[0]);
    assert_eq!(c.engine().targets()[599], points[2]);
}

#[test]
fn render_frame_matches_buffer() {
    let mut c = controller(ShapeVariant::Flower);
    c.set_particle_size(2.0);
    c.render_tick(1.0);
    let frame = c.frame(1.0);
    assert_eq!(frame.positions.len(), 600);
    assert_eq!(frame.colors.len(), 600);
    assert_eq!(frame.rotations.len(), 600);
    assert_abs_diff_eq!(frame.scales[0], 0.44, epsilon = 1e-12);
    assert_abs_diff_eq!(frame.cloud_rotation, 0.1);

    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("\"cloud_rotation\""));
}
