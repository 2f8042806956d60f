//! Particle-cloud morphing engine.
//!
//! Procedural shape generators fill a fixed-size target buffer; a per-tick
//! morph pulls a live particle buffer toward an expanded copy of those
//! targets; a coarse pixel heuristic turns camera frames into a smoothed
//! openness signal that drives the expansion.
//!
//! Zero I/O. Frame capture, drawing and network shape generation live with
//! the caller.

pub mod color;
pub mod constants;
pub mod controller;
pub mod densify;
pub mod error;
pub mod external;
pub mod gesture;
pub mod morph;
pub mod point;
pub mod shape;
pub mod smoother;

pub use color::{DEFAULT_COLOR, Hsl, PALETTE, Rgb, assign_gradient};
pub use constants::{FRAME_HEIGHT, FRAME_WIDTH, MAX_EXTERNAL_POINTS, PARTICLE_COUNT};
pub use controller::{Controller, ControllerConfig, TargetOrigin};
pub use densify::{Densify, densify, fit_to_count};
pub use error::{Error, Result};
pub use external::{export_point_cloud, parse_point_cloud};
pub use gesture::{
    FrameError, FrameSource, FrameStats, GestureFrame, GestureSignalExtractor, analyze, is_skin,
};
pub use morph::{MorphEngine, ParticleBuffer, RenderFrame};
pub use point::Point3;
pub use shape::{ShapeVariant, generate};
pub use smoother::{OpennessReader, Smoother};
