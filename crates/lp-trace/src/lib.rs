//! Trajectory planning from a binary edge mask.
//!
//! Three stages, each deterministic:
//! - [`extract_components`]: 8-connected labeling of foreground pixels.
//! - [`linearize`]: greedy walk of one component (4-neighbors before
//!   diagonals, row-major tie-break) with backtracking at dead ends.
//! - [`stitch`]: nearest-point ordering of components from the pen position,
//!   rotating each path so the nearest point comes first.
//!
//! [`plan_trajectory`] runs all three. A mask with no foreground produces a
//! blank single-point [`Trajectory`] at the configured start.

mod components;
mod linearize;
mod plan;
mod stitch;

pub use components::{Component, extract_components};
pub use linearize::{Degeneracy, LinearizedPath, Recovery, linearize};
pub use plan::{PlanConfig, TrajectoryStats, plan_trajectory};
pub use stitch::{Trajectory, stitch};
