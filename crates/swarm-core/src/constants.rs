/// Particle count for the process lifetime (target and particle buffers).
pub const PARTICLE_COUNT: usize = 3000;

/// Sphere radius.
pub const SPHERE_RADIUS: f64 = 4.0;

/// Cube side length (solid fill, centered on the origin).
pub const CUBE_SIZE: f64 = 5.0;

/// Scale applied to the 2D parametric heart curve.
pub const HEART_SCALE: f64 = 0.2;

/// Helix radius for both DNA strands.
pub const HELIX_RADIUS: f64 = 2.0;

/// Full turns of the helix across the buffer.
pub const HELIX_TURNS: f64 = 4.0;

/// Half of the helix height; y runs from -HELIX_HALF_HEIGHT to +HELIX_HALF_HEIGHT.
pub const HELIX_HALF_HEIGHT: f64 = 4.0;

/// Saturn planet radius.
pub const PLANET_RADIUS: f64 = 2.5;

/// Share of the buffer given to the planet body.
pub const PLANET_SHARE: f64 = 0.6;

/// Saturn ring inner radius.
pub const RING_INNER: f64 = 3.5;

/// Saturn ring outer radius.
pub const RING_OUTER: f64 = 6.0;

/// Saturn ring half-thickness.
pub const RING_HALF_THICKNESS: f64 = 0.1;

/// Rose-curve petal parameter for the Flower shape.
pub const FLOWER_K: f64 = 4.0;

/// Openness → radial displacement gain.
pub const EXPANSION_GAIN: f64 = 6.0;

/// Breathing oscillation amplitude.
pub const BREATHE_AMPLITUDE: f64 = 0.15;

/// Breathing oscillation angular rate (rad/s).
pub const BREATHE_RATE: f64 = 1.5;

/// Per-index phase stagger of the breathing oscillation.
pub const BREATHE_STAGGER: f64 = 0.02;

/// Fraction of the remaining gap covered per morph tick.
pub const LERP_SPEED: f64 = 0.08;

/// Added to target norms so the origin has a defined direction.
pub const DIRECTION_EPSILON: f64 = 0.001;

/// Particle scale at zero openness.
pub const SCALE_BASE: f64 = 0.22;

/// Scale reduction per unit openness.
pub const SCALE_OPENNESS_GAIN: f64 = 0.15;

/// Minimum base scale.
pub const SCALE_FLOOR: f64 = 0.05;

/// Particle-size multiplier bounds.
pub const SIZE_MIN: f64 = 0.1;
pub const SIZE_MAX: f64 = 3.0;

/// Whole-cloud spin rate (rad/s) handed to the presentation layer.
pub const CLOUD_SPIN_RATE: f64 = 0.1;

/// EMA factor applied to raw openness samples.
pub const SMOOTHING_FACTOR: f64 = 0.1;

/// Gesture frame resolution.
pub const FRAME_WIDTH: usize = 32;
pub const FRAME_HEIGHT: usize = 24;

/// Per-pixel channel difference that saturates the motion ratio.
pub const MOTION_SENSITIVITY: f64 = 50.0;

/// Raw openness weights.
pub const SKIN_WEIGHT: f64 = 2.0;
pub const MOTION_WEIGHT: f64 = 0.5;

/// Hue band spanned by the color gradient across the buffer.
pub const HUE_SPREAD: f64 = 0.1;

/// Lightness jitter half-range.
pub const LIGHTNESS_JITTER: f64 = 0.2;

/// Saturation added to the base color.
pub const SATURATION_BOOST: f64 = 0.1;

/// Lowest lightness a particle may take.
pub const LIGHTNESS_FLOOR: f64 = 0.1;

/// Upper bound on points accepted from the external shape generator.
pub const MAX_EXTERNAL_POINTS: usize = 500;
