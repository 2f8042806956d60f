//! Headless cooperative loop: one camera tick then one render tick per step.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use swarm_core::{Controller, FrameError, FrameSource, RenderFrame};

use crate::frames::{PpmSequence, SyntheticHand};

/// Where gesture frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CameraSource {
    Synthetic,
    Directory(PathBuf),
}

impl std::str::FromStr for CameraSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("synthetic") {
            CameraSource::Synthetic
        } else {
            CameraSource::Directory(PathBuf::from(s))
        })
    }
}

impl CameraSource {
    pub fn acquire(&self) -> Result<Box<dyn FrameSource>, FrameError> {
        match self {
            CameraSource::Synthetic => Ok(Box::new(SyntheticHand::new())),
            CameraSource::Directory(dir) => {
                let frames = PpmSequence::open(dir)?;
                tracing::info!(
                    "playing {} frames from {}",
                    frames.frame_count(),
                    dir.display()
                );
                Ok(Box::new(frames))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub ticks: u64,
    pub fps: f64,
    /// Pace ticks to wall-clock time instead of running flat out.
    pub realtime: bool,
}

/// What a run ended with.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub ticks: u64,
    pub camera_frames: u64,
    pub interrupted: bool,
    pub openness: f64,
    /// Largest particle distance from the origin.
    pub extent: f64,
    pub mean_scale: f64,
    pub last_frame: RenderFrame,
}

impl RunSummary {
    pub fn print(&self) {
        println!("ticks:         {}", self.ticks);
        println!("camera frames: {}", self.camera_frames);
        println!("openness:      {:.3}", self.openness);
        println!("extent:        {:.3}", self.extent);
        println!("mean scale:    {:.3}", self.mean_scale);
        if self.interrupted {
            println!("(interrupted)");
        }
    }
}

/// Drive `controller` for `options.ticks` steps or until Ctrl-C. The camera,
/// if active, is released before returning.
pub async fn run(controller: &mut Controller, options: &RunOptions) -> Result<RunSummary> {
    anyhow::ensure!(
        options.fps.is_finite() && options.fps > 0.0,
        "fps must be positive"
    );

    let stop = Arc::new(AtomicBool::new(false));
    let watcher = {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping");
                stop.store(true, Ordering::Release);
            }
        })
    };

    let step = Duration::from_secs_f64(1.0 / options.fps);
    let mut interval = tokio::time::interval(step);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut ticks = 0;
    let mut camera_frames = 0;
    while ticks < options.ticks {
        if stop.load(Ordering::Acquire) {
            break;
        }
        if options.realtime {
            interval.tick().await;
        } else if ticks % 256 == 0 {
            tokio::task::yield_now().await;
        }

        if let Some((stats, smoothed)) = controller.frame_tick_stats() {
            camera_frames += 1;
            tracing::trace!(
                "frame {camera_frames}: skin={:.3} motion={:.3} raw={:.3} smoothed={smoothed:.3}",
                stats.skin_ratio,
                stats.motion_ratio,
                stats.raw_openness
            );
        }
        let time = ticks as f64 / options.fps;
        controller.render_tick(time);
        ticks += 1;
    }
    watcher.abort();

    let interrupted = ticks < options.ticks;
    controller.deactivate_camera();

    let time = ticks.saturating_sub(1) as f64 / options.fps;
    let last_frame = controller.frame(time);
    let extent = last_frame
        .positions
        .iter()
        .map(|p| p.norm())
        .fold(0.0, f64::max);
    let mean_scale = if last_frame.scales.is_empty() {
        0.0
    } else {
        last_frame.scales.iter().sum::<f64>() / last_frame.scales.len() as f64
    };
    tracing::info!("run finished after {ticks} ticks ({camera_frames} camera frames)");

    Ok(RunSummary {
        ticks,
        camera_frames,
        interrupted,
        openness: controller.openness(),
        extent,
        mean_scale,
        last_frame,
    })
}

pub fn write_snapshot(path: &std::path::Path, frame: &RenderFrame) -> Result<()> {
    let json = serde_json::to_string(frame).context("failed to serialize frame")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
