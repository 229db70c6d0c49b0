//! Binary edge mask in, galvo laser command stream out.
//!
//! ```text
//! mask ─▶ extract_components ─▶ linearize ─▶ stitch ─▶ colorize ─▶ encode_commands
//! ```
//!
//! [`process_frame`] runs the whole chain for one frame. The stage crates are
//! re-exported for callers that need a single step.

mod config;
mod output;
mod pipeline;

pub use config::{Config, Destination, FrameConfig, OutputConfig, OutputFormat};
pub use output::{next_numbered_path, numbered_files, write_text_output};
pub use pipeline::{FrameOutput, FrameSummary, process_frame, process_mask};

pub use lp_encode as encode;
pub use lp_link as link;
pub use lp_trace as trace;

pub use lp_core::{BinaryMask, Error, Image, ImageView, Point, Rgb};
pub use lp_encode::{ColoredPoint, Command, Control};
pub use lp_trace::{Trajectory, TrajectoryStats};
