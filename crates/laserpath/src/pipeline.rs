use lp_core::{BinaryMask, Error, ImageView, Rgb};
use lp_encode::{ColoredPoint, Command, colorize, encode_commands};
use lp_trace::{Trajectory, TrajectoryStats, plan_trajectory};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::FrameConfig;

/// Everything produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub trajectory: Trajectory,
    pub colored: Vec<ColoredPoint>,
    pub commands: Vec<Command>,
    pub stats: TrajectoryStats,
}

/// Per-frame record for run summaries.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    #[serde(flatten)]
    pub stats: TrajectoryStats,
    pub commands: usize,
    pub blank: bool,
}

impl FrameOutput {
    pub fn summary(&self, index: usize) -> FrameSummary {
        FrameSummary {
            index,
            stats: self.stats,
            commands: self.commands.len(),
            blank: self.trajectory.is_blank(),
        }
    }
}

/// Thresholds `mask`, plans, colorizes from `color` and encodes.
pub fn process_frame(
    mask: &ImageView<'_, u8>,
    color: &ImageView<'_, Rgb>,
    cfg: &FrameConfig,
) -> Result<FrameOutput, Error> {
    if mask.dimensions() != color.dimensions() {
        return Err(Error::DimensionMismatch {
            mask: mask.dimensions(),
            color: color.dimensions(),
        });
    }
    let mask = BinaryMask::from_threshold(mask, cfg.mask_threshold);
    process_mask(&mask, color, cfg)
}

/// As [`process_frame`] for an already binarized mask.
pub fn process_mask(
    mask: &BinaryMask,
    color: &ImageView<'_, Rgb>,
    cfg: &FrameConfig,
) -> Result<FrameOutput, Error> {
    if mask.dimensions() != color.dimensions() {
        return Err(Error::DimensionMismatch {
            mask: mask.dimensions(),
            color: color.dimensions(),
        });
    }

    let trajectory = plan_trajectory(mask, &cfg.plan);
    let colored = colorize(&trajectory, color)?;
    let commands = encode_commands(&colored);
    let stats = TrajectoryStats::from_trajectory(&trajectory);

    for d in trajectory.degeneracies() {
        debug!(at = ?d.at, recovery = ?d.recovery, "degeneracy");
    }
    info!(
        points = stats.points,
        components = stats.components,
        jumps = stats.jumps,
        jump_distance = stats.jump_distance,
        degeneracies = stats.degeneracies,
        "frame processed"
    );

    Ok(FrameOutput {
        trajectory,
        colored,
        commands,
        stats,
    })
}
