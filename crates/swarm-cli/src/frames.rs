//! Frame sources for headless runs: a procedural hand and a directory of
//! binary PPM frames.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use swarm_core::{FrameError, FrameSource, GestureFrame};

const BACKGROUND: [u8; 3] = [24, 24, 32];
const SKIN: [u8; 3] = [205, 135, 100];

/// Largest accepted PPM side, in pixels.
const MAX_PPM_SIDE: usize = 8192;

/// Frames per open/close cycle of the synthetic hand.
const SYNTHETIC_PERIOD: f64 = 120.0;

/// A skin-toned disc that grows and shrinks, standing in for a hand
/// opening and closing in front of the camera.
#[derive(Debug, Default)]
pub struct SyntheticHand {
    frame: u64,
    stopped: bool,
}

impl SyntheticHand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disc radius as a fraction of the shorter frame side, in [0.1, 0.5].
    fn radius_fraction(frame: u64) -> f64 {
        let phase = (frame as f64 / SYNTHETIC_PERIOD) * TAU;
        0.1 + 0.4 * (0.5 - 0.5 * phase.cos())
    }
}

impl FrameSource for SyntheticHand {
    fn frame_ready(&mut self) -> bool {
        !self.stopped
    }

    fn read_frame(&mut self, width: usize, height: usize) -> Result<GestureFrame, FrameError> {
        if self.stopped {
            return Err(FrameError::Unavailable("synthetic source stopped".to_string()));
        }
        let radius = Self::radius_fraction(self.frame) * width.min(height) as f64;
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let inside = (dx * dx + dy * dy).sqrt() <= radius;
                pixels.push(if inside { SKIN } else { BACKGROUND });
            }
        }
        self.frame += 1;
        GestureFrame::new(width, height, pixels)
    }

    fn stop(&mut self) {
        self.stopped = true;
        tracing::debug!("synthetic hand stopped after {} frames", self.frame);
    }
}

/// Plays `*.ppm` files from a directory in name order, looping.
#[derive(Debug)]
pub struct PpmSequence {
    files: Vec<PathBuf>,
    next: usize,
    stopped: bool,
}

impl PpmSequence {
    pub fn open(dir: &Path) -> Result<Self, FrameError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| FrameError::Unavailable(format!("{}: {e}", dir.display())))?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("ppm"))
            })
            .collect();
        if files.is_empty() {
            return Err(FrameError::Unavailable(format!(
                "no .ppm frames in {}",
                dir.display()
            )));
        }
        files.sort();
        Ok(Self {
            files,
            next: 0,
            stopped: false,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for PpmSequence {
    fn frame_ready(&mut self) -> bool {
        !self.stopped
    }

    fn read_frame(&mut self, width: usize, height: usize) -> Result<GestureFrame, FrameError> {
        if self.stopped {
            return Err(FrameError::Unavailable("frame sequence stopped".to_string()));
        }
        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();
        let bytes = std::fs::read(path)
            .map_err(|e| FrameError::Read(format!("{}: {e}", path.display())))?;
        let frame = decode_ppm(&bytes)
            .map_err(|e| FrameError::Read(format!("{}: {e}", path.display())))?;
        Ok(frame.downsample(width, height))
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Decode a binary (P6) PPM with an 8-bit max value.
pub fn decode_ppm(bytes: &[u8]) -> Result<GestureFrame, String> {
    let mut pos = 0;
    let magic = header_token(bytes, &mut pos).ok_or("missing magic number")?;
    if magic != b"P6" {
        return Err("not a binary PPM (P6)".to_string());
    }
    let width = header_number(bytes, &mut pos, "width")?;
    let height = header_number(bytes, &mut pos, "height")?;
    if width == 0 || height == 0 {
        return Err(format!("empty frame {width}x{height}"));
    }
    if width > MAX_PPM_SIDE || height > MAX_PPM_SIDE {
        return Err(format!("frame too large: {width}x{height}"));
    }
    let max = header_number(bytes, &mut pos, "max value")?;
    if max == 0 || max > 255 {
        return Err(format!("unsupported max value {max}"));
    }
    // Exactly one whitespace byte separates the header from the raster.
    pos += 1;

    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or("frame too large")?;
    let end = pos.checked_add(len).ok_or("frame too large")?;
    let data = bytes
        .get(pos..end)
        .ok_or_else(|| format!("raster truncated: want {len} bytes"))?;
    let frame = if max == 255 {
        GestureFrame::from_rgb(width, height, data)
    } else {
        let scaled: Vec<u8> = data
            .iter()
            .map(|&v| ((v as usize * 255) / max).min(255) as u8)
            .collect();
        GestureFrame::from_rgb(width, height, &scaled)
    };
    frame.map_err(|e| e.to_string())
}

fn header_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < bytes.len() && bytes[*pos] == b'#' {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (start < *pos).then(|| &bytes[start..*pos])
}

fn header_number(bytes: &[u8], pos: &mut usize, what: &str) -> Result<usize, String> {
    let token = header_token(bytes, pos).ok_or_else(|| format!("missing {what}"))?;
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("bad {what}"))
}

#[cfg(test)]
fn encode_ppm(frame: &GestureFrame) -> Vec<u8> {
    let mut out = format!("P6\n{} {}\n255\n", frame.width(), frame.height()).into_bytes();
    out.extend(frame.pixels().iter().flatten());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::analyze;
    use tempfile::TempDir;

    #[test]
    fn test_synthetic_hand_opens_and_closes() {
        let mut hand = SyntheticHand::new();
        let closed = hand.read_frame(32, 24).unwrap();
        for _ in 1..60 {
            hand.read_frame(32, 24).unwrap();
        }
        let open = hand.read_frame(32, 24).unwrap();
        let closed_skin = analyze(&closed, None).skin_ratio;
        let open_skin = analyze(&open, None).skin_ratio;
        assert!(open_skin > closed_skin + 0.2, "{closed_skin} -> {open_skin}");
    }

    #[test]
    fn test_synthetic_hand_stops() {
        let mut hand = SyntheticHand::new();
        hand.stop();
        assert!(!hand.frame_ready());
        assert!(hand.read_frame(4, 4).is_err());
    }

    #[test]
    fn test_decode_ppm_with_comment() {
        let mut bytes = b"P6\n# made by hand\n2 1\n255\n".to_vec();
        bytes.extend([255, 0, 0, 0, 0, 255]);
        let frame = decode_ppm(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 1));
        assert_eq!(frame.pixel(0, 0), [255, 0, 0]);
        assert_eq!(frame.pixel(1, 0), [0, 0, 255]);
    }

    #[test]
    fn test_decode_ppm_rejects_bad_input() {
        assert!(decode_ppm(b"P3\n1 1\n255\n000").is_err());
        assert!(decode_ppm(b"P6\n2 2\n255\n\x00\x00").is_err());
        assert!(decode_ppm(b"P6\n1 1\n65535\n\x00\x00\x00\x00\x00\x00").is_err());
    }

    #[test]
    fn test_decode_ppm_rejects_empty_frame() {
        let err = decode_ppm(b"P6\n0 0\n255\n").unwrap_err();
        assert!(err.contains("empty frame"), "{err}");
        assert!(decode_ppm(b"P6\n4 0\n255\n").is_err());
    }

    #[test]
    fn test_decode_ppm_rejects_huge_dimensions() {
        let err = decode_ppm(b"P6\n9999999999 9999999999\n255\n\x00\x00\x00").unwrap_err();
        assert!(err.contains("too large"), "{err}");
        let err = decode_ppm(b"P6\n8193 1\n255\n\x00").unwrap_err();
        assert!(err.contains("too large"), "{err}");
    }

    #[test]
    fn test_zero_size_ppm_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("empty.ppm"), b"P6\n0 0\n255\n").unwrap();
        let mut seq = PpmSequence::open(dir.path()).unwrap();
        let err = seq.read_frame(32, 24).unwrap_err();
        assert!(matches!(err, FrameError::Read(_)));
    }

    #[test]
    fn test_encode_decode_frame() {
        let frame = GestureFrame::uniform(3, 2, SKIN);
        let decoded = decode_ppm(&encode_ppm(&frame)).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_ppm_sequence_loops_and_downsamples() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("a.ppm"),
            encode_ppm(&GestureFrame::uniform(64, 48, SKIN)),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.ppm"),
            encode_ppm(&GestureFrame::uniform(64, 48, BACKGROUND)),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut seq = PpmSequence::open(dir.path()).unwrap();
        assert_eq!(seq.frame_count(), 2);
        let first = seq.read_frame(32, 24).unwrap();
        assert_eq!((first.width(), first.height()), (32, 24));
        assert_eq!(first.pixel(0, 0), SKIN);
        assert_eq!(seq.read_frame(32, 24).unwrap().pixel(0, 0), BACKGROUND);
        assert_eq!(seq.read_frame(32, 24).unwrap().pixel(0, 0), SKIN);
    }

    #[test]
    fn test_ppm_sequence_empty_dir_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = PpmSequence::open(dir.path()).unwrap_err();
        assert!(matches!(err, FrameError::Unavailable(_)));
        let err = PpmSequence::open(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FrameError::Unavailable(_)));
    }
}
