//! Heuristic "openness" signal from low-resolution camera frames.
//!
//! This is deliberately coarse and is not hand detection. It blends two cues:
//! the share of pixels passing a fixed RGB skin-tone rule, and the summed
//! channel difference against the previous frame. Lighting changes and
//! skin-toned backgrounds both move the signal.

use std::fmt;

use crate::constants::{FRAME_HEIGHT, FRAME_WIDTH, MOTION_SENSITIVITY, MOTION_WEIGHT, SKIN_WEIGHT};

#[derive(Debug)]
pub enum FrameError {
    /// The source could not be acquired (no device, permission denied, ...).
    Unavailable(String),
    /// A frame could not be read from an acquired source.
    Read(String),
    /// Pixel data does not match the declared dimensions.
    Dimensions {
        width: usize,
        height: usize,
        pixels: usize,
    },
    /// Packed byte buffer of the wrong length for the declared dimensions.
    Bytes { expected: usize, actual: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            FrameError::Read(msg) => write!(f, "read failed: {msg}"),
            FrameError::Dimensions {
                width,
                height,
                pixels,
            } => write!(f, "{pixels} pixels do not fill a {width}x{height} frame"),
            FrameError::Bytes { expected, actual } => {
                write!(f, "expected {expected} bytes of pixel data, got {actual}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Row-major RGB pixel grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureFrame {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl GestureFrame {
    /// Both dimensions must be non-zero and `pixels` must fill them exactly.
    pub fn new(width: usize, height: usize, pixels: Vec<[u8; 3]>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(pixels.len()) {
            return Err(FrameError::Dimensions {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Every pixel set to `rgb`.
    pub fn uniform(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgb; width * height],
        }
    }

    /// From packed RGBA bytes; alpha is dropped.
    pub fn from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Self, FrameError> {
        check_byte_len(width, height, 4, data)?;
        let pixels = data.chunks_exact(4).map(|p| [p[0], p[1], p[2]]).collect();
        Self::new(width, height, pixels)
    }

    /// From packed RGB bytes.
    pub fn from_rgb(width: usize, height: usize, data: &[u8]) -> Result<Self, FrameError> {
        check_byte_len(width, height, 3, data)?;
        let pixels = data.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Nearest-neighbour resample to `width`×`height`. An empty frame
    /// resamples to black.
    pub fn downsample(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.pixels.is_empty() {
            return Self::uniform(width, height, [0, 0, 0]);
        }
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let sy = (y * self.height / height.max(1)).min(self.height.saturating_sub(1));
            for x in 0..width {
                let sx = (x * self.width / width.max(1)).min(self.width.saturating_sub(1));
                pixels.push(self.pixel(sx, sy));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

fn check_byte_len(
    width: usize,
    height: usize,
    channels: usize,
    data: &[u8],
) -> Result<(), FrameError> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FrameError::Dimensions {
            width,
            height,
            pixels: data.len() / channels,
        })?;
    if data.len() != expected {
        return Err(FrameError::Bytes {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Fixed RGB skin-tone rule.
pub fn is_skin([r, g, b]: [u8; 3]) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && max - min > 15
}

/// Per-frame measurements feeding the raw openness value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub motion_sum: u64,
    pub skin_count: usize,
    pub motion_ratio: f64,
    pub skin_ratio: f64,
    pub raw_openness: f64,
}

/// Score `current` against `previous`. Motion is zero without a previous
/// frame of the same size.
pub fn analyze(current: &GestureFrame, previous: Option<&GestureFrame>) -> FrameStats {
    let previous = previous.filter(|p| p.same_size(current));

    let mut motion_sum: u64 = 0;
    let mut skin_count = 0usize;
    for (i, px) in current.pixels.iter().enumerate() {
        if let Some(prev) = previous {
            let q = prev.pixels[i];
            motion_sum += (0..3).map(|c| px[c].abs_diff(q[c]) as u64).sum::<u64>();
        }
        if is_skin(*px) {
            skin_count += 1;
        }
    }

    let total = current.pixels.len();
    if total == 0 {
        return FrameStats {
            motion_sum,
            skin_count,
            motion_ratio: 0.0,
            skin_ratio: 0.0,
            raw_openness: 0.0,
        };
    }

    let motion_ratio = (motion_sum as f64 / (total as f64 * MOTION_SENSITIVITY)).min(1.0);
    let skin_ratio = skin_count as f64 / total as f64;
    let raw_openness = (skin_ratio * SKIN_WEIGHT + motion_ratio * MOTION_WEIGHT).min(1.0);

    FrameStats {
        motion_sum,
        skin_count,
        motion_ratio,
        skin_ratio,
        raw_openness,
    }
}

/// A pull-based supplier of camera frames.
pub trait FrameSource {
    /// Whether a frame newer than the last read is available.
    fn frame_ready(&mut self) -> bool;

    /// Read the current frame, ideally at `width`×`height`.
    fn read_frame(&mut self, width: usize, height: usize) -> Result<GestureFrame, FrameError>;

    /// Stop all underlying capture. Called exactly once when the source is released.
    fn stop(&mut self);
}

enum ExtractorState {
    Inactive,
    Active {
        source: Box<dyn FrameSource>,
        previous: Option<GestureFrame>,
    },
}

/// Owns the frame source while active, plus the single previous frame.
pub struct GestureSignalExtractor {
    state: ExtractorState,
    width: usize,
    height: usize,
}

impl Default for GestureSignalExtractor {
    fn default() -> Self {
        Self::new(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

impl GestureSignalExtractor {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            state: ExtractorState::Inactive,
            width,
            height,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ExtractorState::Active { .. })
    }

    pub fn has_previous(&self) -> bool {
        matches!(
            self.state,
            ExtractorState::Active {
                previous: Some(_),
                ..
            }
        )
    }

    /// Acquire a source and start producing. Any current source is released
    /// first. On failure the extractor stays inactive.
    pub fn activate<F>(&mut self, acquire: F) -> Result<(), FrameError>
    where
        F: FnOnce() -> Result<Box<dyn FrameSource>, FrameError>,
    {
        self.deactivate();
        match acquire() {
            Ok(source) => {
                tracing::debug!("gesture source acquired");
                self.state = ExtractorState::Active {
                    source,
                    previous: None,
                };
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to acquire gesture source: {e}");
                Err(e)
            }
        }
    }

    /// Release the source and forget the previous frame. No-op when inactive.
    pub fn deactivate(&mut self) {
        if let ExtractorState::Active { mut source, .. } =
            std::mem::replace(&mut self.state, ExtractorState::Inactive)
        {
            source.stop();
            tracing::debug!("gesture source released");
        }
    }

    /// Process one frame if active and one is ready.
    pub fn tick(&mut self) -> Option<FrameStats> {
        let ExtractorState::Active { source, previous } = &mut self.state else {
            return None;
        };
        if !source.frame_ready() {
            return None;
        }

        let frame = match source.read_frame(self.width, self.height) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("skipping frame: {e}");
                return None;
            }
        };
        let frame = if frame.width() == self.width && frame.height() == self.height {
            frame
        } else {
            frame.downsample(self.width, self.height)
        };

        let stats = analyze(&frame, previous.as_ref());
        *previous = Some(frame);
        Some(stats)
    }
}

impl Drop for GestureSignalExtractor {
    fn drop(&mut self) {
        self.deactivate();
    }
}
