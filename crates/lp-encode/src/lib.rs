//! From a planned trajectory to what the galvo controller consumes.
//!
//! - [`colorize`] samples a color image along the path, blanking the beam on
//!   jumps.
//! - [`encode_commands`] maps pixels to mirrored 16-bit DAC values and packs
//!   8-byte [`Command`] records (big-endian, last one marks end of frame).
//! - [`coe`], [`traj`] and [`csv`] are the on-disk text forms, each with a
//!   writer and a line-numbered parser.
//! - [`render_colored`] rasterizes a colored trajectory for previews.

mod colorize;
mod command;
mod error;
mod hex;
mod render;

pub mod coe;
pub mod csv;
pub mod traj;

pub use coe::{coe_string, parse_coe, write_coe};
pub use colorize::{ColoredPoint, colorize};
pub use command::{
    Command, Control, DAC_SCALE, MAX_UNCLAMPED_COORD, dac_transform, encode_commands,
    from_wire_bytes, to_wire_bytes,
};
pub use csv::{csv_string, parse_csv, write_csv};
pub use error::CodecError;
pub use render::{draw_jumps, render_colored};
pub use traj::{parse_traj, traj_string, write_traj};
