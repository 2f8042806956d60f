//! `~/.swarm/config.toml` and friends.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use swarm_core::{ControllerConfig, FRAME_HEIGHT, FRAME_WIDTH, PARTICLE_COUNT, Rgb, ShapeVariant};

pub const DEFAULT_FPS: f64 = 60.0;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SwarmConfig {
    pub particle_count: usize,
    pub shape: ShapeVariant,
    /// Palette name or hex string.
    pub color: String,
    pub particle_size: f64,
    pub openness: f64,
    pub frame_width: usize,
    pub frame_height: usize,
    pub seed: Option<u64>,
    pub fps: f64,
    pub remote: RemoteConfig,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            shape: ShapeVariant::Saturn,
            color: "blue".to_string(),
            particle_size: 1.0,
            openness: 0.0,
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            seed: None,
            fps: DEFAULT_FPS,
            remote: RemoteConfig::default(),
        }
    }
}

impl SwarmConfig {
    /// Resolve and load: explicit path, then `SWARM_CONFIG`, then
    /// `$HOME/.swarm/config.toml` if it exists, else defaults. An explicitly
    /// named file that is missing is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os("SWARM_CONFIG").filter(|v| !v.is_empty()) {
            return Self::from_file(Path::new(&path));
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn base_color(&self) -> Result<Rgb> {
        self.color
            .parse()
            .with_context(|| format!("invalid color in config: {}", self.color))
    }

    pub fn controller_config(&self) -> Result<ControllerConfig> {
        anyhow::ensure!(self.particle_count > 0, "particle_count must be positive");
        anyhow::ensure!(
            self.frame_width > 0 && self.frame_height > 0,
            "frame size must be positive"
        );
        Ok(ControllerConfig {
            particle_count: self.particle_count,
            shape: self.shape,
            color: self.base_color()?,
            particle_size: self.particle_size,
            openness: self.openness,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            seed: self.seed,
        })
    }
}

fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".swarm").join("config.toml"))
}
