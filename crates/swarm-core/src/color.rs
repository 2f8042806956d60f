//! Base color parsing and the per-particle hue/lightness gradient.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{HUE_SPREAD, LIGHTNESS_FLOOR, LIGHTNESS_JITTER, SATURATION_BOOST};
use crate::error::Error;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").unwrap());

/// Swatches offered by the control panel, by name.
pub const PALETTE: [(&str, Rgb); 9] = [
    ("white", Rgb::from_hex(0xffffff)),
    ("red", Rgb::from_hex(0xef4444)),
    ("blue", Rgb::from_hex(0x3b82f6)),
    ("emerald", Rgb::from_hex(0x10b981)),
    ("amber", Rgb::from_hex(0xf59e0b)),
    ("violet", Rgb::from_hex(0x8b5cf6)),
    ("pink", Rgb::from_hex(0xec4899)),
    ("cyan", Rgb::from_hex(0x06b6d4)),
    ("fuchsia", Rgb::from_hex(0xd946ef)),
];

/// Default base color (palette blue).
pub const DEFAULT_COLOR: Rgb = Rgb::from_hex(0x3b82f6);

/// Linear RGB, each channel in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue, saturation, lightness, each in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// From a packed 0xRRGGBB value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f64 / 255.0,
            g: ((hex >> 8) & 0xff) as f64 / 255.0,
            b: (hex & 0xff) as f64 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (min + max) / 2.0;

        if min == max {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let delta = max - min;
        let s = if l <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let h = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        Hsl { h: h / 6.0, s, l }
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        let h = hsl.h.rem_euclid(1.0);
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self::new(
            hue_to_channel(q, p, h + 1.0 / 3.0),
            hue_to_channel(q, p, h),
            hue_to_channel(q, p, h - 1.0 / 3.0),
        )
    }

    /// Resolve a palette name.
    pub fn named(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `#rrggbb`, `#rgb` (leading `#` optional) or a palette name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(c) = Rgb::named(s) {
            return Ok(c);
        }
        let caps = HEX_COLOR
            .captures(s)
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        let digits = &caps[1];
        let expanded: String = if digits.len() == 3 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_string()
        };
        let hex =
            u32::from_str_radix(&expanded, 16).map_err(|_| Error::InvalidColor(s.to_string()))?;
        Ok(Rgb::from_hex(hex))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Spread `base` into `count` per-particle colors.
///
/// Hue drifts linearly across a small band over the buffer; lightness gets an
/// independent jitter per particle, re-rolled on every call.
pub fn assign_gradient(base: Rgb, count: usize, rng: &mut impl Rng) -> Vec<Rgb> {
    let hsl = base.to_hsl();
    (0..count)
        .map(|i| {
            let hue_shift = (i as f64 / count as f64) * HUE_SPREAD - HUE_SPREAD / 2.0;
            let jitter = rng.random::<f64>() * 2.0 * LIGHTNESS_JITTER - LIGHTNESS_JITTER;
            Rgb::from_hsl(Hsl {
                h: (hsl.h + hue_shift + 1.0) % 1.0,
                s: (hsl.s + SATURATION_BOOST).min(1.0),
                l: (hsl.l + jitter).clamp(LIGHTNESS_FLOOR, 1.0),
            })
        })
        .collect()
}
