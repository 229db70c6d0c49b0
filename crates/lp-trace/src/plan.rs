use lp_core::{BinaryMask, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::extract_components;
use crate::linearize::linearize;
use crate::stitch::{Trajectory, stitch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Pen position the first nearest-point search starts from. Also the
    /// single point of a blank frame.
    pub start: Point,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            start: Point::ORIGIN,
        }
    }
}

/// Extracts, linearizes and stitches every component of `mask`.
pub fn plan_trajectory(mask: &BinaryMask, cfg: &PlanConfig) -> Trajectory {
    let components = extract_components(mask);
    let paths = components.iter().map(linearize).collect();
    let trajectory = stitch(paths, cfg.start);

    debug!(
        components = components.len(),
        points = trajectory.len(),
        degeneracies = trajectory.degeneracies().len(),
        "planned trajectory"
    );

    trajectory
}

/// Jump diagnostics for one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryStats {
    pub points: usize,
    pub components: usize,
    pub degeneracies: usize,
    /// Consecutive pairs that are not 8-adjacent.
    pub jumps: usize,
    /// Summed Euclidean length of all jumps, in pixels.
    pub jump_distance: f64,
}

impl TrajectoryStats {
    pub fn from_trajectory(t: &Trajectory) -> Self {
        let mut jumps = 0;
        let mut jump_distance = 0.0;
        for w in t.points().windows(2) {
            if !w[0].is_adjacent8(w[1]) {
                jumps += 1;
                jump_distance += w[0].dist(w[1]);
            }
        }

        Self {
            points: t.len(),
            components: t.segments().len(),
            degeneracies: t.degeneracies().len(),
            jumps,
            jump_distance,
        }
    }
}
